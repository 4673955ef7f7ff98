//! Per-resource attachment policies.
//!
//! A policy is a list of rules. Each rule ties a set of filename extensions to
//! the MIME types that may be declared for them and the kinds the payload may
//! sniff as. An attachment is acceptable when some rule matches all three.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::ResourceKind;
use crate::sniff::DetectedKind;

/// One allowed `{extension, MIME, sniffed kind}` combination set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRule {
    extensions: Vec<String>,
    mime_types: Vec<String>,
    kinds: Vec<DetectedKind>,
}

impl AttachmentRule {
    /// Creates a rule. Extensions include the leading dot (`.tar.gz`).
    #[must_use]
    pub fn new(extensions: &[&str], mime_types: &[&str], kinds: &[DetectedKind]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            mime_types: mime_types.iter().map(|m| m.to_ascii_lowercase()).collect(),
            kinds: kinds.to_vec(),
        }
    }

    /// Whether the lower-cased `filename` ends with one of the rule's extensions.
    #[must_use]
    pub fn matches_filename(&self, filename: &str) -> bool {
        let filename = filename.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|ext| filename.len() > ext.len() && filename.ends_with(ext.as_str()))
    }

    /// Whether `mime_type` (already normalized) may be declared.
    #[must_use]
    pub fn allows_mime(&self, mime_type: &str) -> bool {
        self.mime_types.iter().any(|m| m == mime_type)
    }

    /// Whether a payload that sniffed as `kind` is acceptable.
    #[must_use]
    pub fn allows_kind(&self, kind: DetectedKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Accepted extensions.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// Source of attachment rules for one resource kind.
pub trait AttachmentPolicy: Send + Sync {
    /// Rules an attachment may satisfy.
    fn rules(&self) -> &[AttachmentRule];
}

/// Policy backed by a fixed rule list.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    rules: Vec<AttachmentRule>,
}

impl StaticPolicy {
    /// Creates a policy from explicit rules.
    #[must_use]
    pub fn new(rules: Vec<AttachmentRule>) -> Self {
        Self { rules }
    }

    /// Adds a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: AttachmentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Policy shared by all quality metric collections.
    ///
    /// `.tgz` files declared as `application/x-tar` are accepted whether the
    /// payload is gzip-wrapped or a plain tar, since submitters commonly name
    /// plain tarballs that way.
    #[must_use]
    pub fn quality_metric() -> Self {
        use DetectedKind::{Gzip, Jpeg, Pdf, Png, Tar, TarGzip};

        Self::new(vec![
            AttachmentRule::new(
                &[".tgz", ".tar.gz"],
                &[
                    "application/x-tar",
                    "application/gzip",
                    "application/x-gzip",
                    "application/x-compressed-tar",
                ],
                &[TarGzip, Tar],
            ),
            AttachmentRule::new(&[".tar"], &["application/x-tar"], &[Tar]),
            AttachmentRule::new(
                &[".gz"],
                &["application/gzip", "application/x-gzip"],
                &[Gzip, TarGzip],
            ),
            AttachmentRule::new(&[".pdf"], &["application/pdf"], &[Pdf]),
            AttachmentRule::new(&[".png"], &["image/png"], &[Png]),
            AttachmentRule::new(&[".jpg", ".jpeg"], &["image/jpeg"], &[Jpeg]),
        ])
    }
}

impl AttachmentPolicy for StaticPolicy {
    fn rules(&self) -> &[AttachmentRule] {
        &self.rules
    }
}

/// Policies keyed by resource kind.
#[derive(Clone, Default)]
pub struct PolicyTable {
    policies: HashMap<ResourceKind, Arc<dyn AttachmentPolicy>>,
}

impl PolicyTable {
    /// Empty table; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in table covering every [`ResourceKind`].
    #[must_use]
    pub fn standard() -> Self {
        let quality_metric: Arc<dyn AttachmentPolicy> = Arc::new(StaticPolicy::quality_metric());
        let mut table = Self::empty();
        for kind in ResourceKind::ALL {
            table.policies.insert(kind, Arc::clone(&quality_metric));
        }
        table
    }

    /// Registers or replaces the policy for `kind`.
    #[must_use]
    pub fn with_policy(
        mut self,
        kind: ResourceKind,
        policy: impl AttachmentPolicy + 'static,
    ) -> Self {
        self.policies.insert(kind, Arc::new(policy));
        self
    }

    /// Policy for `kind`, if registered.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<&dyn AttachmentPolicy> {
        self.policies.get(&kind).map(|policy| &**policy)
    }
}

impl std::fmt::Debug for PolicyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyTable")
            .field("kinds", &self.policies.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("test.tgz", true)]
    #[case("TEST.TGZ", true)]
    #[case("run.tar.gz", true)]
    #[case("test.txt", false)]
    #[case(".tgz", false)]
    #[case("tgz", false)]
    fn test_tarball_rule_matches_filename(#[case] filename: &str, #[case] expected: bool) {
        let rule = AttachmentRule::new(&[".tgz", ".tar.gz"], &["application/x-tar"], &[]);
        assert_eq!(rule.matches_filename(filename), expected);
    }

    #[test]
    fn test_rule_allows() {
        let rule = AttachmentRule::new(&[".pdf"], &["Application/PDF"], &[DetectedKind::Pdf]);
        assert!(rule.allows_mime("application/pdf"));
        assert!(!rule.allows_mime("image/png"));
        assert!(rule.allows_kind(DetectedKind::Pdf));
        assert!(!rule.allows_kind(DetectedKind::Unknown));
    }

    #[test]
    fn test_standard_table_covers_every_kind() {
        let table = PolicyTable::standard();
        for kind in ResourceKind::ALL {
            let policy = table.get(kind).expect("policy registered");
            assert!(!policy.rules().is_empty());
        }
    }

    #[test]
    fn test_empty_table_misses() {
        assert!(
            PolicyTable::empty()
                .get(ResourceKind::GenericQualityMetric)
                .is_none()
        );
    }

    #[test]
    fn test_with_policy_replaces() {
        let text_only = StaticPolicy::default().with_rule(AttachmentRule::new(
            &[".txt"],
            &["text/plain"],
            &[DetectedKind::Unknown],
        ));
        let table =
            PolicyTable::standard().with_policy(ResourceKind::MicroRnaQualityMetric, text_only);

        let rules = table
            .get(ResourceKind::MicroRnaQualityMetric)
            .expect("policy registered")
            .rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].extensions(), [".txt".to_string()]);
    }
}
