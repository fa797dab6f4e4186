use crate::membership::MembershipFunction;

/// Named membership functions of one variable, kept in insertion order.
///
/// Term names are unique; lookups are linear since variables rarely carry
/// more than a handful of terms.
#[derive(Clone, Debug, Default)]
pub struct Terms(Vec<(String, MembershipFunction)>);

impl Terms {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the function back if `name` is already taken.
    pub(crate) fn insert(&mut self, name: String, mf: MembershipFunction) -> Result<(), (String, MembershipFunction)> {
        if self.contains(&name) {
            return Err((name, mf));
        }

        self.0.push((name, mf));

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MembershipFunction> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, mf)| mf)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(n, _)| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MembershipFunction)> {
        self.0.iter().map(|(n, mf)| (n.as_str(), mf))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[test]
fn test_terms_keep_order_and_reject_duplicates() {
    let mut terms = Terms::new();

    terms
        .insert("baixo".into(), MembershipFunction::Triangular(0., 0., 50.))
        .unwrap();
    terms
        .insert("medio".into(), MembershipFunction::Triangular(25., 50., 75.))
        .unwrap();
    terms
        .insert("alto".into(), MembershipFunction::Triangular(50., 100., 100.))
        .unwrap();

    let (name, _) = terms
        .insert("medio".into(), MembershipFunction::Triangular(0., 1., 2.))
        .unwrap_err();

    assert_eq!(name, "medio");
    assert_eq!(terms.len(), 3);
    assert_eq!(terms.names().collect::<Vec<_>>(), ["baixo", "medio", "alto"]);
    assert_eq!(terms.position("alto"), Some(2));
    assert_eq!(terms.get("medio"), Some(&MembershipFunction::Triangular(25., 50., 75.)));
    assert!(terms.get("muito alto").is_none());
}
