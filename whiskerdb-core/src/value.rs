use std::{collections::BTreeMap, fmt::Display};

static ABSENT: Value = Value::Absent;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// Numbers are returned as-is, text is parsed after trimming.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A node of a decoded acquisition file.
///
/// Decoders of array-oriented formats wrap almost everything in one or more
/// single-element arrays, so callers should go through [`Value::unwrap_one`],
/// [`Value::unwrap_list`] and [`Value::field`] rather than matching directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Struct(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Scalar(Scalar::Text(s)) => s.is_empty(),
            Self::Scalar(Scalar::Number(_)) | Self::Struct(_) => false,
            Self::Sequence(items) => match items.as_slice() {
                [] => true,
                [only] => only.is_empty(),
                _ => false,
            },
        }
    }

    /// Descends through sequence wrappers (always taking the first element)
    /// until a scalar or a struct is reached. Empty data at any level yields
    /// `None`.
    #[must_use]
    pub fn unwrap_one(&self) -> Option<&Self> {
        let mut current = self;

        loop {
            match current {
                Self::Absent => return None,
                Self::Scalar(Scalar::Text(s)) if s.is_empty() => return None,
                Self::Sequence(items) => current = items.first()?,
                leaf => return Some(leaf),
            }
        }
    }

    /// Flattens nested sequences in order, unwrapping every element on its
    /// own. Empty elements keep their position as `None` so that parallel
    /// lists stay aligned. An empty input yields `None`.
    #[must_use]
    pub fn unwrap_list(&self) -> Option<Vec<Option<&Self>>> {
        if self.is_empty() {
            return None;
        }

        let mut flattened = Vec::new();
        self.flatten_into(&mut flattened);

        Some(flattened)
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<Option<&'a Self>>) {
        match self {
            Self::Sequence(items) if items.is_empty() => out.push(None),
            Self::Sequence(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other.unwrap_one()),
        }
    }

    #[must_use]
    pub fn scalar(&self) -> Option<&Scalar> {
        match self.unwrap_one()? {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The scalar rendered as text; numbers lose a zero fractional part so
    /// that `141021.0` reads back as `"141021"`.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.scalar().map(ToString::to_string)
    }

    #[must_use]
    pub fn number(&self) -> Option<f64> {
        self.scalar().and_then(Scalar::as_f64)
    }

    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.unwrap_list()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| v.and_then(Self::text))
            .collect()
    }

    /// Every element as an optional number, in order.
    #[must_use]
    pub fn numbers(&self) -> Vec<Option<f64>> {
        self.unwrap_list()
            .unwrap_or_default()
            .into_iter()
            .map(|v| v.and_then(Self::number))
            .collect()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> &Self {
        match self.unwrap_one() {
            Some(Self::Struct(fields)) => fields.get(name).unwrap_or(&ABSENT),
            _ => &ABSENT,
        }
    }

    #[must_use]
    pub fn has_struct(&self) -> bool {
        matches!(self.unwrap_one(), Some(Self::Struct(_)))
    }

    /// The elements of the innermost sequence reached by stripping
    /// single-element wrappers around another sequence.
    #[must_use]
    pub fn items(&self) -> &[Self] {
        let mut current = self;

        loop {
            match current {
                Self::Sequence(items) => match items.as_slice() {
                    [inner @ Self::Sequence(_)] => current = inner,
                    _ => return items,
                },
                Self::Absent => return &[],
                leaf => return std::slice::from_ref(leaf),
            }
        }
    }

    #[must_use]
    pub fn element(&self, index: usize) -> &Self {
        self.items().get(index).unwrap_or(&ABSENT)
    }

    /// Rows of a two-dimensional numeric array. A one-dimensional input is a
    /// single row.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        let items = self.items();

        if items.iter().all(|i| !matches!(i, Self::Sequence(_))) {
            return vec![self.numbers()];
        }

        items.iter().map(Self::numbers).collect()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(Scalar::Text(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(Scalar::Text(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::Number(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Sequence(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn wrap(mut value: Value, depth: usize) -> Value {
        for _ in 0..depth {
            value = Value::Sequence(vec![value]);
        }
        value
    }

    #[rstest]
    fn singleton_wrappers_unwrap_to_scalar(#[values(0, 1, 2, 3, 4, 5)] depth: usize) {
        let wrapped = wrap(Value::from("ANM244028"), depth);
        assert_eq!(wrapped.unwrap_one(), Some(&Value::from("ANM244028")));

        let wrapped = wrap(Value::from(141_021.0), depth);
        assert_eq!(wrapped.text().as_deref(), Some("141021"));
    }

    #[rstest]
    fn empty_at_any_depth_is_absent(#[values(0, 1, 2, 3, 4, 5)] depth: usize) {
        let wrapped = wrap(Value::Sequence(vec![]), depth);
        assert_eq!(wrapped.unwrap_one(), None);
        assert_eq!(wrapped.unwrap_list(), None);
        assert!(wrapped.is_empty());

        assert_eq!(wrap(Value::from(""), depth).unwrap_one(), None);
    }

    #[test]
    fn list_keeps_positions_of_empty_elements() {
        let value = Value::from(vec![
            Value::from(vec![Value::from(vec![Value::from("Go")])]),
            Value::Sequence(vec![]),
            Value::from(vec![Value::from("NoGo")]),
        ]);

        let texts: Vec<_> = value
            .unwrap_list()
            .unwrap()
            .into_iter()
            .map(|v| v.and_then(Value::text))
            .collect();

        assert_eq!(
            texts,
            vec![Some("Go".to_string()), None, Some("NoGo".to_string())]
        );
    }

    #[test]
    fn row_vector_flattens() {
        let value = wrap(
            Value::from(vec![Value::from(1.0), Value::from(2.0), Value::from(3.0)]),
            2,
        );

        assert_eq!(value.numbers(), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn struct_fields_through_wrappers() {
        let inner = Value::structure([("animal_ID", wrap(Value::from("ANM1"), 2))]);
        let root = Value::structure([("meta_data", wrap(inner, 2))]);

        assert_eq!(
            root.field("meta_data").field("animal_ID").text().as_deref(),
            Some("ANM1")
        );
        assert_eq!(root.field("meta_data").field("missing"), &Value::Absent);
        assert!(root.field("meta_data").has_struct());
    }

    #[test]
    fn items_and_rows() {
        let behav = Value::structure([("idStr", Value::from("thetaAtBase"))]);
        let ephys = Value::structure([("idStr", Value::from("voltage"))]);
        let value = wrap(Value::from(vec![behav.clone(), ephys]), 1);

        assert_eq!(value.items().len(), 2);
        assert_eq!(value.element(0), &behav);
        assert_eq!(value.element(5), &Value::Absent);

        let matrix = Value::from(vec![
            Value::from(vec![Value::from(1.0), Value::from(0.0)]),
            Value::from(vec![Value::from(0.0), Value::from(1.0)]),
        ]);
        assert_eq!(
            matrix.rows(),
            vec![vec![Some(1.0), Some(0.0)], vec![Some(0.0), Some(1.0)]]
        );
    }
}
