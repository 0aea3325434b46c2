// Operator Registry
// The closed set of generator expression operators and their declared policies

use crate::error::{EvalError, EvalResult};

/// Number of parameters an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Range(min, max) => count >= min && count <= max,
        }
    }

    pub fn describe(self) -> String {
        match self {
            Arity::Exact(0) => "no parameters".to_string(),
            Arity::Exact(n) => format!("exactly {}", n),
            Arity::AtLeast(n) => format!("at least {}", n),
            Arity::Range(min, max) => format!("{} to {}", min, max),
        }
    }

    /// Fail with an arity mismatch unless `count` is accepted
    pub fn check(self, operator: &str, count: usize) -> EvalResult<()> {
        if self.accepts(count) {
            Ok(())
        } else {
            Err(EvalError::ArityMismatch {
                operator: operator.to_string(),
                expected: self.describe(),
                actual: count,
            })
        }
    }
}

/// How an operator records the targets it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    None,
    /// Recorded in all-targets-seen only
    Observe,
    /// Recorded as a dependency edge and in all-targets-seen
    Depend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Logic
    Zero,
    One,
    And,
    Or,
    Not,
    If,
    Bool,

    // Comparison
    StrEqual,
    Equal,
    InList,
    VersionLess,
    VersionGreater,
    VersionEqual,
    VersionLessEqual,
    VersionGreaterEqual,

    // Strings
    LowerCase,
    UpperCase,
    MakeCIdentifier,
    AngleR,
    Comma,
    Semicolon,

    // Lists
    Join,
    RemoveDuplicates,
    Filter,

    // Context queries
    Config,
    PlatformId,
    CCompilerId,
    CxxCompilerId,
    CCompilerVersion,
    CxxCompilerVersion,
    CompileLanguage,
    CompileLangAndId,
    CompileFeatures,

    // Targets
    TargetProperty,
    TargetName,
    TargetExists,
    TargetNameIfExists,
    TargetFile,
    TargetFileName,
    TargetFileDir,
    TargetLinkerFile,
    TargetLinkerFileName,
    TargetLinkerFileDir,
    TargetObjects,
    GenexEval,
    TargetGenexEval,

    // Usage requirements
    BuildInterface,
    InstallInterface,
    LinkOnly,
}

impl Operator {
    pub const ALL: &'static [Operator] = &[
        Operator::Zero,
        Operator::One,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::If,
        Operator::Bool,
        Operator::StrEqual,
        Operator::Equal,
        Operator::InList,
        Operator::VersionLess,
        Operator::VersionGreater,
        Operator::VersionEqual,
        Operator::VersionLessEqual,
        Operator::VersionGreaterEqual,
        Operator::LowerCase,
        Operator::UpperCase,
        Operator::MakeCIdentifier,
        Operator::AngleR,
        Operator::Comma,
        Operator::Semicolon,
        Operator::Join,
        Operator::RemoveDuplicates,
        Operator::Filter,
        Operator::Config,
        Operator::PlatformId,
        Operator::CCompilerId,
        Operator::CxxCompilerId,
        Operator::CCompilerVersion,
        Operator::CxxCompilerVersion,
        Operator::CompileLanguage,
        Operator::CompileLangAndId,
        Operator::CompileFeatures,
        Operator::TargetProperty,
        Operator::TargetName,
        Operator::TargetExists,
        Operator::TargetNameIfExists,
        Operator::TargetFile,
        Operator::TargetFileName,
        Operator::TargetFileDir,
        Operator::TargetLinkerFile,
        Operator::TargetLinkerFileName,
        Operator::TargetLinkerFileDir,
        Operator::TargetObjects,
        Operator::GenexEval,
        Operator::TargetGenexEval,
        Operator::BuildInterface,
        Operator::InstallInterface,
        Operator::LinkOnly,
    ];

    /// Look up an operator by the name written in the marker
    pub fn from_name(name: &str) -> Option<Operator> {
        Operator::ALL.iter().copied().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Zero => "0",
            Operator::One => "1",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::If => "IF",
            Operator::Bool => "BOOL",
            Operator::StrEqual => "STREQUAL",
            Operator::Equal => "EQUAL",
            Operator::InList => "IN_LIST",
            Operator::VersionLess => "VERSION_LESS",
            Operator::VersionGreater => "VERSION_GREATER",
            Operator::VersionEqual => "VERSION_EQUAL",
            Operator::VersionLessEqual => "VERSION_LESS_EQUAL",
            Operator::VersionGreaterEqual => "VERSION_GREATER_EQUAL",
            Operator::LowerCase => "LOWER_CASE",
            Operator::UpperCase => "UPPER_CASE",
            Operator::MakeCIdentifier => "MAKE_C_IDENTIFIER",
            Operator::AngleR => "ANGLE-R",
            Operator::Comma => "COMMA",
            Operator::Semicolon => "SEMICOLON",
            Operator::Join => "JOIN",
            Operator::RemoveDuplicates => "REMOVE_DUPLICATES",
            Operator::Filter => "FILTER",
            Operator::Config => "CONFIG",
            Operator::PlatformId => "PLATFORM_ID",
            Operator::CCompilerId => "C_COMPILER_ID",
            Operator::CxxCompilerId => "CXX_COMPILER_ID",
            Operator::CCompilerVersion => "C_COMPILER_VERSION",
            Operator::CxxCompilerVersion => "CXX_COMPILER_VERSION",
            Operator::CompileLanguage => "COMPILE_LANGUAGE",
            Operator::CompileLangAndId => "COMPILE_LANG_AND_ID",
            Operator::CompileFeatures => "COMPILE_FEATURES",
            Operator::TargetProperty => "TARGET_PROPERTY",
            Operator::TargetName => "TARGET_NAME",
            Operator::TargetExists => "TARGET_EXISTS",
            Operator::TargetNameIfExists => "TARGET_NAME_IF_EXISTS",
            Operator::TargetFile => "TARGET_FILE",
            Operator::TargetFileName => "TARGET_FILE_NAME",
            Operator::TargetFileDir => "TARGET_FILE_DIR",
            Operator::TargetLinkerFile => "TARGET_LINKER_FILE",
            Operator::TargetLinkerFileName => "TARGET_LINKER_FILE_NAME",
            Operator::TargetLinkerFileDir => "TARGET_LINKER_FILE_DIR",
            Operator::TargetObjects => "TARGET_OBJECTS",
            Operator::GenexEval => "GENEX_EVAL",
            Operator::TargetGenexEval => "TARGET_GENEX_EVAL",
            Operator::BuildInterface => "BUILD_INTERFACE",
            Operator::InstallInterface => "INSTALL_INTERFACE",
            Operator::LinkOnly => "LINK_ONLY",
        }
    }

    pub fn arity(self) -> Arity {
        use Operator::*;
        match self {
            AngleR | Comma | Semicolon => Arity::Exact(0),
            And | Or | CompileFeatures => Arity::AtLeast(1),
            Config | PlatformId | CCompilerId | CxxCompilerId | CompileLanguage => {
                Arity::AtLeast(0)
            }
            CompileLangAndId => Arity::AtLeast(2),
            CCompilerVersion | CxxCompilerVersion => Arity::Range(0, 1),
            TargetProperty => Arity::Range(1, 2),
            If | Filter => Arity::Exact(3),
            StrEqual | Equal | InList | VersionLess | VersionGreater | VersionEqual
            | VersionLessEqual | VersionGreaterEqual | Join | TargetGenexEval => Arity::Exact(2),
            Zero | One | Not | Bool | LowerCase | UpperCase | MakeCIdentifier
            | RemoveDuplicates | TargetName | TargetExists | TargetNameIfExists | TargetFile
            | TargetFileName | TargetFileDir | TargetLinkerFile | TargetLinkerFileName
            | TargetLinkerFileDir | TargetObjects | GenexEval | BuildInterface
            | InstallInterface | LinkOnly => Arity::Exact(1),
        }
    }

    /// Which collection a target resolved by this operator lands in
    pub fn tracking(self) -> Tracking {
        use Operator::*;
        match self {
            TargetProperty | TargetFile | TargetFileName | TargetFileDir | TargetLinkerFile
            | TargetLinkerFileName | TargetLinkerFileDir | TargetObjects => Tracking::Depend,
            TargetExists | TargetNameIfExists | TargetGenexEval => Tracking::Observe,
            _ => Tracking::None,
        }
    }

    /// Result may differ between configurations
    pub fn is_config_sensitive(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Config
                | TargetFile
                | TargetFileName
                | TargetFileDir
                | TargetLinkerFile
                | TargetLinkerFileName
                | TargetLinkerFileDir
                | TargetObjects
        )
    }

    /// Result may differ depending on the head target
    pub fn is_head_sensitive(self) -> bool {
        matches!(self, Operator::CompileFeatures)
    }

    /// Parameters are evaluated by the operator itself, not up front
    pub fn is_lazy(self) -> bool {
        matches!(
            self,
            Operator::Zero
                | Operator::And
                | Operator::Or
                | Operator::If
                | Operator::InstallInterface
        )
    }

    /// Extra commas belong to the single parameter
    pub fn accepts_arbitrary_content(self) -> bool {
        matches!(
            self,
            Operator::Zero | Operator::One | Operator::BuildInterface | Operator::InstallInterface
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_name(op.name()), Some(*op));
        }
        assert_eq!(Operator::from_name("NOPE"), None);
        assert_eq!(Operator::from_name("config"), None);
    }

    #[test]
    fn test_arity() {
        assert!(Operator::If.arity().accepts(3));
        assert!(!Operator::If.arity().accepts(2));
        assert!(Operator::Config.arity().accepts(0));
        assert!(Operator::TargetProperty.arity().accepts(1));
        assert!(Operator::TargetProperty.arity().accepts(2));
        assert!(!Operator::TargetProperty.arity().accepts(3));
        assert!(!Operator::AngleR.arity().accepts(1));
    }

    #[test]
    fn test_arity_check_error() {
        let err = Operator::Not.arity().check("NOT", 2).unwrap_err();
        assert_eq!(err.to_string(), "$<NOT> expects exactly 1, got 2 parameter(s)");
        assert!(Arity::AtLeast(1).check("AND", 0).is_err());
    }

    #[test]
    fn test_declared_policies() {
        assert_eq!(Operator::TargetProperty.tracking(), Tracking::Depend);
        assert_eq!(Operator::TargetExists.tracking(), Tracking::Observe);
        assert_eq!(Operator::StrEqual.tracking(), Tracking::None);

        assert!(Operator::Config.is_config_sensitive());
        assert!(!Operator::PlatformId.is_config_sensitive());
        assert!(Operator::CompileFeatures.is_head_sensitive());

        assert!(Operator::And.is_lazy());
        assert!(!Operator::Not.is_lazy());
        assert!(Operator::BuildInterface.accepts_arbitrary_content());
        assert!(!Operator::Join.accepts_arbitrary_content());
    }
}
