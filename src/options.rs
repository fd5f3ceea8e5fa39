//! Parser options

use serde::{Deserialize, Serialize};

pub use crate::ast::SourceType;

/// ECMAScript language version
///
/// Versions below ES2015 are not supported; `Latest` enables everything the
/// crate implements (currently ES2022).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EcmaVersion {
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    Es2019,
    Es2020,
    Es2021,
    Es2022,
    Latest,
}

impl EcmaVersion {
    /// Numeric edition (6..=13); `Latest` maps past every gate
    fn edition(self) -> u32 {
        match self {
            EcmaVersion::Es2015 => 6,
            EcmaVersion::Es2016 => 7,
            EcmaVersion::Es2017 => 8,
            EcmaVersion::Es2018 => 9,
            EcmaVersion::Es2019 => 10,
            EcmaVersion::Es2020 => 11,
            EcmaVersion::Es2021 => 12,
            EcmaVersion::Es2022 => 13,
            EcmaVersion::Latest => u32::MAX,
        }
    }

    /// Does this version include edition `n` (6 = ES2015 … 13 = ES2022)?
    pub fn at_least(self, edition: u32) -> bool {
        self.edition() >= edition
    }

    /// Interpret a numeric version: an edition number (6..) or a year
    /// (2015..)
    pub fn from_number(n: u32) -> Option<Self> {
        let edition = if n >= 2015 { n - 2015 + 6 } else { n };
        Some(match edition {
            6 => EcmaVersion::Es2015,
            7 => EcmaVersion::Es2016,
            8 => EcmaVersion::Es2017,
            9 => EcmaVersion::Es2018,
            10 => EcmaVersion::Es2019,
            11 => EcmaVersion::Es2020,
            12 => EcmaVersion::Es2021,
            13 => EcmaVersion::Es2022,
            _ => return None,
        })
    }
}

impl Default for EcmaVersion {
    fn default() -> Self {
        EcmaVersion::Latest
    }
}

/// Parser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Language version to parse; later constructs are rejected
    pub ecma_version: EcmaVersion,
    /// `Script` or `Module`; module implies strict mode, import/export and
    /// top-level `await`
    pub source_type: SourceType,
    /// Accept `return` outside any function
    pub allow_return_outside_function: bool,
    /// Accept import/export statements below the top level
    pub allow_import_export_everywhere: bool,
    /// Accept `await` outside async functions in scripts
    pub allow_await_outside_function: bool,
    /// Accept `super` outside methods
    pub allow_super_outside_method: bool,
    /// Skip a leading `#!` line
    pub allow_hash_bang: bool,
    /// Wrap `( … )` groups in ParenthesizedExpression nodes
    pub preserve_parens: bool,
    /// Line/column positions in the JSON view (spans always carry them)
    pub locations: bool,
    /// `[start, end]` ranges in the JSON view (spans always carry them)
    pub ranges: bool,
    /// Stamped on the program's JSON view as `sourceFile`
    pub direct_source_file: Option<String>,
    /// Collect comments into the parse output
    pub collect_comments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ecma_version: EcmaVersion::Latest,
            source_type: SourceType::Script,
            allow_return_outside_function: false,
            allow_import_export_everywhere: false,
            allow_await_outside_function: false,
            allow_super_outside_method: false,
            allow_hash_bang: false,
            preserve_parens: false,
            locations: false,
            ranges: false,
            direct_source_file: None,
            collect_comments: false,
        }
    }
}

impl Options {
    /// Options for module source
    pub fn module() -> Self {
        Self {
            source_type: SourceType::Module,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_gates() {
        assert!(EcmaVersion::Latest.at_least(13));
        assert!(EcmaVersion::Es2020.at_least(11));
        assert!(!EcmaVersion::Es2020.at_least(12));
        assert!(EcmaVersion::Es2015.at_least(6));
    }

    #[test]
    fn test_from_number() {
        assert_eq!(EcmaVersion::from_number(2020), Some(EcmaVersion::Es2020));
        assert_eq!(EcmaVersion::from_number(13), Some(EcmaVersion::Es2022));
        assert_eq!(EcmaVersion::from_number(5), None);
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.source_type, SourceType::Script);
        assert!(!options.preserve_parens);
        assert_eq!(Options::module().source_type, SourceType::Module);
    }
}
