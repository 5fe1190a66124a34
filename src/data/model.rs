use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// RecordLabel – the identifying value of a record
// ---------------------------------------------------------------------------

/// The `index` of a record as it appeared in the source file.
/// Kept typed so `12` and `"12"` stay distinct; `Ord` so labels can live in a
/// `BTreeSet` for colouring.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordLabel {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Eq for RecordLabel {}

impl PartialOrd for RecordLabel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordLabel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use RecordLabel::*;
        fn discriminant(v: &RecordLabel) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordLabel::Text(s) => write!(f, "{s}"),
            RecordLabel::Integer(i) => write!(f, "{i}"),
            RecordLabel::Float(v) => write!(f, "{v:.4}"),
            RecordLabel::Bool(b) => write!(f, "{b}"),
            RecordLabel::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for RecordLabel {
    fn from(s: &str) -> Self {
        RecordLabel::Text(s.to_string())
    }
}

impl From<i64> for RecordLabel {
    fn from(i: i64) -> Self {
        RecordLabel::Integer(i)
    }
}

// ---------------------------------------------------------------------------
// Record – one ECG sample
// ---------------------------------------------------------------------------

/// A single sample: the raw signal plus its identifying label.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Signal values in source order.
    pub data: Vec<f64>,
    /// Identifying / label value (`index` in the source file).
    pub index: RecordLabel,
}

impl Record {
    pub fn new(data: Vec<f64>, index: impl Into<RecordLabel>) -> Self {
        Self {
            data,
            index: index.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – an ordered collection of records
// ---------------------------------------------------------------------------

/// Which of the two datasets a load or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Test,
    Train,
}

impl DatasetKind {
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Test => "test",
            DatasetKind::Train => "train",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A loaded dataset. Record order is the source file order and is what
/// positions in the UI refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Sorted set of distinct labels.
    pub labels: BTreeSet<RecordLabel>,
}

impl Dataset {
    /// Build the label index from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let labels = records.iter().map(|r| r.index.clone()).collect();
        Dataset { records, labels }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_collected_sorted_and_unique() {
        let ds = Dataset::from_records(vec![
            Record::new(vec![1.0], "b"),
            Record::new(vec![2.0], "a"),
            Record::new(vec![3.0], "b"),
        ]);
        let labels: Vec<String> = ds.labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[1].index, RecordLabel::from("a"));
    }

    #[test]
    fn labels_of_different_kinds_order_by_kind_first() {
        let mut labels = vec![
            RecordLabel::Text("0".into()),
            RecordLabel::Integer(5),
            RecordLabel::Null,
            RecordLabel::Float(0.5),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                RecordLabel::Null,
                RecordLabel::Integer(5),
                RecordLabel::Float(0.5),
                RecordLabel::Text("0".into()),
            ]
        );
    }
}
