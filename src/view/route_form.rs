//! The route panel's list of segment input fields.

use crate::request::{FormError, RouteRequest, form::FormRules};

/// Ordered segment fields. Never empty after [`RouteForm::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteForm {
    fields: Vec<String>,
}

impl Default for RouteForm {
    fn default() -> Self {
        Self {
            fields: vec![String::new()],
        }
    }
}

impl RouteForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled with the given segment texts.
    pub fn with_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Self::default();
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a blank field and return its index.
    pub fn add_segment(&mut self) -> usize {
        self.fields.push(String::new());
        self.fields.len() - 1
    }

    /// Remove a field. Out-of-range indices are ignored.
    pub fn remove_segment(&mut self, index: usize) -> Option<String> {
        (index < self.fields.len()).then(|| self.fields.remove(index))
    }

    /// Replace a field's text. Returns `false` if `index` is out of range.
    pub fn set(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                *field = text.into();
                true
            }
            None => false,
        }
    }

    /// Drop every field and leave one blank one.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.add_segment();
    }

    /// Placeholder text for the field at `index`.
    pub fn placeholder(index: usize) -> String {
        format!("Features for Segment {} (comma separated)", index + 1)
    }

    pub fn to_request(&self, rules: &FormRules) -> Result<RouteRequest, FormError> {
        RouteRequest::from_inputs(&self.fields, rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_one_blank_field() {
        let form = RouteForm::new();
        assert_eq!(form.fields(), &[String::new()]);
    }

    #[test]
    fn add_remove_and_clear() {
        let mut form = RouteForm::new();
        let idx = form.add_segment();
        assert_eq!(idx, 1);
        assert!(form.set(1, "1, 2"));
        assert!(!form.set(5, "x"));

        assert_eq!(form.remove_segment(0), Some(String::new()));
        assert_eq!(form.remove_segment(9), None);
        assert_eq!(form.fields(), &["1, 2".to_string()]);

        form.add_segment();
        form.clear();
        assert_eq!(form.len(), 1);
        assert_eq!(form.fields()[0], "");
    }

    #[test]
    fn placeholder_is_one_based() {
        assert_eq!(
            RouteForm::placeholder(0),
            "Features for Segment 1 (comma separated)"
        );
    }

    #[test]
    fn builds_route_request() {
        let form = RouteForm::with_fields(["1, 2", "", "3"]);
        let req = form.to_request(&FormRules::default()).unwrap();
        assert_eq!(req.segments, vec![vec![1.0, 2.0], vec![3.0]]);
    }

    #[test]
    fn empty_prefill_falls_back_to_blank_field() {
        let form = RouteForm::with_fields(Vec::<String>::new());
        assert_eq!(form.len(), 1);
    }
}
