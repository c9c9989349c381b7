use super::InputExtractor;
use crate::raw_request::RawRequest;
use waystation_core::{AppError, Input};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rename {
    from: String,
    to: String,
    override_existing: bool,
}

/// Key renames applied to an extractor's output.
///
/// The old key is always removed. Its value lands under the new key unless
/// the new key already holds a non-null value and overriding is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameRules {
    renames: Vec<Rename>,
}

impl RenameRules {
    /// No renames
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `from` to `to`, keeping an existing value at `to`
    #[must_use]
    pub fn rename(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.push(from.into(), to.into(), false)
    }

    /// Move `from` to `to`, replacing any existing value at `to`
    #[must_use]
    pub fn rename_with_override(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.push(from.into(), to.into(), true)
    }

    fn push(mut self, from: String, to: String, override_existing: bool) -> Self {
        self.renames.push(Rename {
            from,
            to,
            override_existing,
        });
        self
    }

    /// Apply the renames in order
    pub fn apply(&self, mut input: Input) -> Input {
        for rename in &self.renames {
            let Some(value) = input.shift_remove(&rename.from) else {
                continue;
            };

            let target_taken = input.get(&rename.to).is_some_and(|v| !v.is_null());
            if rename.override_existing || !target_taken {
                input.insert(rename.to.clone(), value);
            }
        }
        input
    }
}

/// Extractor whose output goes through [`RenameRules`]
#[derive(Debug, Clone)]
pub struct InputRenamer<X> {
    extractor: X,
    rules: RenameRules,
}

impl<X> InputRenamer<X> {
    /// Wrap `extractor`
    pub fn new(extractor: X, rules: RenameRules) -> Self {
        Self { extractor, rules }
    }
}

impl<X: InputExtractor> InputExtractor for InputRenamer<X> {
    fn extract(&self, request: &RawRequest) -> Result<Input, AppError> {
        self.extractor
            .extract(request)
            .map(|input| self.rules.apply(input))
    }
}
