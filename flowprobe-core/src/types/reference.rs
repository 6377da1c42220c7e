/// Source id under which a flow's initial inputs are addressed.
pub const INITIAL_INPUTS_SOURCE: &str = "";

/// A parsed input reference: `"nodeId.outputKey"` or a bare `"variableName"`.
///
/// Only the first `.` separates source from key, so `"a.b.c"` addresses key
/// `"b.c"` of node `"a"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRef<'a> {
    pub source: &'a str,
    pub key: &'a str,
}

impl<'a> InputRef<'a> {
    pub fn parse(reference: &'a str) -> Self {
        match reference.split_once('.') {
            Some((source, key)) => Self { source, key },
            None => Self {
                source: INITIAL_INPUTS_SOURCE,
                key: reference,
            },
        }
    }

    pub fn is_initial_input(&self) -> bool {
        self.source == INITIAL_INPUTS_SOURCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_dot_only() {
        let r = InputRef::parse("login.body.token");
        assert_eq!(r.source, "login");
        assert_eq!(r.key, "body.token");
        assert!(!r.is_initial_input());
    }

    #[test]
    fn bare_name_addresses_initial_inputs() {
        let r = InputRef::parse("baseUrl");
        assert_eq!(r.source, "");
        assert_eq!(r.key, "baseUrl");
        assert!(r.is_initial_input());
    }
}
