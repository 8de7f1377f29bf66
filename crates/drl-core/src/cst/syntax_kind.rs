//! Syntax kind enumeration for the DRL CST
//!
//! This module defines all possible node and token types in the DRL syntax tree.
//! Token kinds and node kinds share one numbering space, the way rowan expects.

use std::fmt;

/// Syntax kind for DRL language elements
///
/// The discriminants are grouped by range:
/// - Trivia (0-9)
/// - Keywords (10-99)
/// - Punctuation and operators (100-159)
/// - Identifiers, literals and opaque text (160-199)
/// - Structural nodes (200+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum DrlSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Spaces and tabs
    Whitespace = 0,
    /// `\n`, `\r\n` or `\r`
    Newline = 1,
    /// Line comment starting with //
    CommentLine = 2,
    /// Block comment /* ... */
    CommentBlock = 3,

    // ==================
    // Keywords (10-99)
    // ==================

    // Declaration keywords
    /// "package"
    PackageKw = 10,
    /// "import"
    ImportKw = 11,
    /// "global"
    GlobalKw = 12,
    /// "function"
    FunctionKw = 13,
    /// "rule"
    RuleKw = 14,
    /// "query"
    QueryKw = 15,
    /// "declare"
    DeclareKw = 16,
    /// "end"
    EndKw = 17,
    /// "when"
    WhenKw = 18,
    /// "then"
    ThenKw = 19,
    /// "extends"
    ExtendsKw = 20,
    /// "static"
    StaticKw = 21,
    /// "trait"
    TraitKw = 22,

    // Conditional element keywords
    /// "and"
    AndKw = 30,
    /// "or"
    OrKw = 31,
    /// "not"
    NotKw = 32,
    /// "exists"
    ExistsKw = 33,
    /// "eval"
    EvalKw = 34,
    /// "forall"
    ForallKw = 35,
    /// "from"
    FromKw = 36,
    /// "accumulate"
    AccumulateKw = 37,
    /// "collect"
    CollectKw = 38,
    /// "over"
    OverKw = 39,
    /// "window"
    WindowKw = 40,
    /// "entry-point"
    EntryPointKw = 41,
    /// "in"
    InKw = 42,
    /// "instanceof"
    InstanceofKw = 43,
    /// "new"
    NewKw = 44,

    // Operators spelled as words
    /// "matches"
    MatchesKw = 50,
    /// "contains"
    ContainsKw = 51,
    /// "memberOf"
    MemberOfKw = 52,
    /// "soundslike"
    SoundslikeKw = 53,
    /// "excludes"
    ExcludesKw = 54,
    /// "str"
    StrKw = 55,

    // Literal keywords
    /// "true"
    TrueKw = 60,
    /// "false"
    FalseKw = 61,
    /// "null"
    NullKw = 62,

    // Rule attribute keywords
    /// "salience"
    SalienceKw = 70,
    /// "no-loop"
    NoLoopKw = 71,
    /// "agenda-group"
    AgendaGroupKw = 72,
    /// "ruleflow-group"
    RuleflowGroupKw = 73,
    /// "activation-group"
    ActivationGroupKw = 74,
    /// "auto-focus"
    AutoFocusKw = 75,
    /// "lock-on-active"
    LockOnActiveKw = 76,
    /// "date-effective"
    DateEffectiveKw = 77,
    /// "date-expires"
    DateExpiresKw = 78,
    /// "dialect"
    DialectKw = 79,
    /// "enabled"
    EnabledKw = 80,
    /// "duration"
    DurationKw = 81,
    /// "timer"
    TimerKw = 82,
    /// "calendars"
    CalendarsKw = 83,
    /// "refract"
    RefractKw = 84,
    /// "direct"
    DirectKw = 85,
    /// "attributes"
    AttributesKw = 86,

    // ==================
    // Punctuation (100-159)
    // ==================
    /// (
    LParen = 100,
    /// )
    RParen = 101,
    /// {
    LBrace = 102,
    /// }
    RBrace = 103,
    /// [
    LBracket = 104,
    /// ]
    RBracket = 105,
    /// ;
    Semicolon = 106,
    /// ,
    Comma = 107,
    /// .
    Dot = 108,
    /// ..
    DotDot = 109,
    /// :
    Colon = 110,
    /// ::
    ColonColon = 111,
    /// :=
    ColonEq = 112,
    /// ?
    Question = 113,
    /// @
    At = 114,
    /// #
    Hash = 115,
    /// ##
    HashHash = 116,
    /// ->
    Arrow = 117,
    /// =
    Eq = 118,
    /// ==
    EqEq = 119,
    /// !=
    Neq = 120,
    /// <
    Lt = 121,
    /// >
    Gt = 122,
    /// <=
    LtEq = 123,
    /// >=
    GtEq = 124,
    /// &&
    AmpAmp = 125,
    /// ||
    PipePipe = 126,
    /// &
    Amp = 127,
    /// |
    Pipe = 128,
    /// ^
    Caret = 129,
    /// ~
    Tilde = 130,
    /// !
    Bang = 131,
    /// !. (null-safe dereference)
    BangDot = 132,
    /// +
    Plus = 133,
    /// -
    Minus = 134,
    /// *
    Star = 135,
    /// /
    Slash = 136,
    /// %
    Percent = 137,
    /// ++
    PlusPlus = 138,
    /// --
    MinusMinus = 139,
    /// +=
    PlusEq = 140,
    /// -=
    MinusEq = 141,
    /// *=
    StarEq = 142,
    /// /=
    SlashEq = 143,

    // ==================
    // Identifiers and literals (160-199)
    // ==================
    /// Identifier, including `$var` bindings
    Ident = 160,
    /// String literal, double or single quoted
    StringLit = 161,
    /// Integer literal, with optional type or time suffix
    IntLit = 162,
    /// Floating point literal
    FloatLit = 163,
    /// Opaque consequence code between `then` and `end`
    ActionText = 164,
    /// Text inserted by a rewrite without being re-lexed
    Verbatim = 165,
    /// Error token or node
    Error = 180,
    /// End of file
    Eof = 181,

    // ==================
    // Declarations (200-239)
    // ==================
    /// Root node
    CompilationUnit = 200,
    /// package a.b.c
    PackageDecl = 201,
    /// import a.b.C
    ImportDecl = 202,
    /// global Type name
    GlobalDecl = 203,
    /// function Type name(params) { ... }
    FunctionDecl = 204,
    /// Balanced-brace function body
    FunctionBody = 205,
    /// ( params )
    ParameterList = 206,
    /// Type name
    Parameter = 207,
    /// query name(params) ... end
    QueryDecl = 208,
    /// declare Name ... end
    DeclareDecl = 209,
    /// name : Type
    FieldDecl = 210,
    /// @name(...)
    Annotation = 211,
    /// rule name ... end
    RuleDecl = 212,
    /// Rule name (string or identifier)
    RuleName = 213,
    /// extends "parent"
    RuleExtends = 214,
    /// All attributes of one rule
    AttributeList = 215,
    /// salience 10
    Attribute = 216,
    /// Value part of an attribute
    AttributeValue = 217,
    /// when ...
    WhenClause = 218,
    /// then ...
    ThenClause = 219,
    /// Consequence code
    ActionBlock = 220,
    /// a.b.C
    QualifiedName = 221,
    /// Type reference with generics and array dimensions
    TypeRef = 222,

    // ==================
    // Conditional elements (240-279)
    // ==================
    /// a or b
    LhsOr = 240,
    /// a and b
    LhsAnd = 241,
    /// not a
    LhsNot = 242,
    /// exists a
    LhsExists = 243,
    /// eval( expr )
    LhsEval = 244,
    /// forall( ... )
    LhsForall = 245,
    /// ( lhs )
    LhsParen = 246,
    /// Person( ... )
    Pattern = 247,
    /// $var :
    Binding = 248,
    /// One constraint of a pattern
    Constraint = 249,
    /// from expr
    FromClause = 250,
    /// accumulate( ... )
    AccumulateClause = 251,
    /// collect( ... )
    CollectClause = 252,
    /// entry-point "stream"
    EntryPoint = 253,
    /// over window:time(30s)
    WindowClause = 254,

    // ==================
    // Expressions (280-319)
    // ==================
    /// a || b, a + b, ...
    BinaryExpr = 280,
    /// a == b, a > b, a contains b, ...
    RelationalExpr = 281,
    /// Comparison with its left operand omitted: `|| == "x"`
    HalfConstraint = 282,
    /// !a, -a
    UnaryExpr = 283,
    /// ( expr )
    ParenExpr = 284,
    /// Literal value
    Literal = 285,
    /// Plain name reference
    NameRef = 286,
    /// a.b
    FieldAccess = 287,
    /// a.b(args)
    MethodCall = 288,
    /// ( args )
    ArgList = 289,
    /// a[i]
    IndexExpr = 290,
    /// a ? b : c
    TernaryExpr = 291,
    /// (Type) expr
    CastExpr = 292,
    /// a#Type
    InlineCast = 293,
    /// [ a, b ] or [ k : v ]
    ArrayInit = 294,
    /// new T(args)
    NewExpr = 295,
    /// Relational operator including `not`, `##` and parameters
    Operator = 296,
    /// [ params ] after a temporal or custom operator
    OperatorParams = 297,
}

impl DrlSyntaxKind {
    /// Check if this is trivia (whitespace, newline, comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::CommentLine | Self::CommentBlock
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (10..100).contains(&(self as u16))
    }

    /// Check if this is punctuation or a symbolic operator
    pub fn is_punct(self) -> bool {
        (100..160).contains(&(self as u16))
    }

    /// Check if this is a literal token (including literal keywords)
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::StringLit
                | Self::IntLit
                | Self::FloatLit
                | Self::TrueKw
                | Self::FalseKw
                | Self::NullKw
        )
    }

    /// Check if this is a node kind
    pub fn is_node(self) -> bool {
        self as u16 >= 200
    }

    /// Check if this is a token kind
    pub fn is_token(self) -> bool {
        !self.is_node() || self == Self::Error
    }

    /// Top-level declarations own their surrounding trivia
    pub fn is_top_level_decl(self) -> bool {
        matches!(
            self,
            Self::PackageDecl
                | Self::ImportDecl
                | Self::GlobalDecl
                | Self::FunctionDecl
                | Self::QueryDecl
                | Self::DeclareDecl
                | Self::RuleDecl
        )
    }

    /// Rule attribute keyword
    pub fn is_attribute_keyword(self) -> bool {
        (70..87).contains(&(self as u16))
    }

    /// Word operator usable between two operands
    pub fn is_word_operator(self) -> bool {
        (50..56).contains(&(self as u16))
    }

    /// Symbolic comparison operator
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::EqEq | Self::Neq | Self::Lt | Self::Gt | Self::LtEq | Self::GtEq
        )
    }

    /// Keywords that can still be used as names in expressions and patterns
    pub fn is_soft_keyword(self) -> bool {
        self.is_attribute_keyword()
            || self.is_word_operator()
            || matches!(
                self,
                Self::OverKw
                    | Self::WindowKw
                    | Self::AccumulateKw
                    | Self::CollectKw
                    | Self::ForallKw
                    | Self::ExistsKw
                    | Self::EvalKw
                    | Self::ExtendsKw
                    | Self::StaticKw
                    | Self::TraitKw
                    | Self::FromKw
            )
    }

    /// Keywords that start a new top-level declaration or close one.
    /// The parser resynchronizes on these after a syntax error.
    pub fn is_boundary_keyword(self) -> bool {
        matches!(
            self,
            Self::RuleKw
                | Self::EndKw
                | Self::FunctionKw
                | Self::GlobalKw
                | Self::QueryKw
                | Self::DeclareKw
                | Self::ImportKw
                | Self::PackageKw
        )
    }

    /// Look up a keyword by its exact (case-sensitive) spelling
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "package" => Self::PackageKw,
            "import" => Self::ImportKw,
            "global" => Self::GlobalKw,
            "function" => Self::FunctionKw,
            "rule" => Self::RuleKw,
            "query" => Self::QueryKw,
            "declare" => Self::DeclareKw,
            "end" => Self::EndKw,
            "when" => Self::WhenKw,
            "then" => Self::ThenKw,
            "extends" => Self::ExtendsKw,
            "static" => Self::StaticKw,
            "trait" => Self::TraitKw,
            "and" => Self::AndKw,
            "or" => Self::OrKw,
            "not" => Self::NotKw,
            "exists" => Self::ExistsKw,
            "eval" => Self::EvalKw,
            "forall" => Self::ForallKw,
            "from" => Self::FromKw,
            "accumulate" => Self::AccumulateKw,
            "collect" => Self::CollectKw,
            "over" => Self::OverKw,
            "window" => Self::WindowKw,
            "entry-point" => Self::EntryPointKw,
            "in" => Self::InKw,
            "instanceof" => Self::InstanceofKw,
            "new" => Self::NewKw,
            "matches" => Self::MatchesKw,
            "contains" => Self::ContainsKw,
            "memberOf" => Self::MemberOfKw,
            "soundslike" => Self::SoundslikeKw,
            "excludes" => Self::ExcludesKw,
            "str" => Self::StrKw,
            "true" => Self::TrueKw,
            "false" => Self::FalseKw,
            "null" => Self::NullKw,
            "salience" => Self::SalienceKw,
            "no-loop" => Self::NoLoopKw,
            "agenda-group" => Self::AgendaGroupKw,
            "ruleflow-group" => Self::RuleflowGroupKw,
            "activation-group" => Self::ActivationGroupKw,
            "auto-focus" => Self::AutoFocusKw,
            "lock-on-active" => Self::LockOnActiveKw,
            "date-effective" => Self::DateEffectiveKw,
            "date-expires" => Self::DateExpiresKw,
            "dialect" => Self::DialectKw,
            "enabled" => Self::EnabledKw,
            "duration" => Self::DurationKw,
            "timer" => Self::TimerKw,
            "calendars" => Self::CalendarsKw,
            "refract" => Self::RefractKw,
            "direct" => Self::DirectKw,
            "attributes" => Self::AttributesKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Fixed source text of keywords and punctuation
    pub fn fixed_text(self) -> Option<&'static str> {
        let text = match self {
            Self::PackageKw => "package",
            Self::ImportKw => "import",
            Self::GlobalKw => "global",
            Self::FunctionKw => "function",
            Self::RuleKw => "rule",
            Self::QueryKw => "query",
            Self::DeclareKw => "declare",
            Self::EndKw => "end",
            Self::WhenKw => "when",
            Self::ThenKw => "then",
            Self::ExtendsKw => "extends",
            Self::StaticKw => "static",
            Self::TraitKw => "trait",
            Self::AndKw => "and",
            Self::OrKw => "or",
            Self::NotKw => "not",
            Self::ExistsKw => "exists",
            Self::EvalKw => "eval",
            Self::ForallKw => "forall",
            Self::FromKw => "from",
            Self::AccumulateKw => "accumulate",
            Self::CollectKw => "collect",
            Self::OverKw => "over",
            Self::WindowKw => "window",
            Self::EntryPointKw => "entry-point",
            Self::InKw => "in",
            Self::InstanceofKw => "instanceof",
            Self::NewKw => "new",
            Self::MatchesKw => "matches",
            Self::ContainsKw => "contains",
            Self::MemberOfKw => "memberOf",
            Self::SoundslikeKw => "soundslike",
            Self::ExcludesKw => "excludes",
            Self::StrKw => "str",
            Self::TrueKw => "true",
            Self::FalseKw => "false",
            Self::NullKw => "null",
            Self::SalienceKw => "salience",
            Self::NoLoopKw => "no-loop",
            Self::AgendaGroupKw => "agenda-group",
            Self::RuleflowGroupKw => "ruleflow-group",
            Self::ActivationGroupKw => "activation-group",
            Self::AutoFocusKw => "auto-focus",
            Self::LockOnActiveKw => "lock-on-active",
            Self::DateEffectiveKw => "date-effective",
            Self::DateExpiresKw => "date-expires",
            Self::DialectKw => "dialect",
            Self::EnabledKw => "enabled",
            Self::DurationKw => "duration",
            Self::TimerKw => "timer",
            Self::CalendarsKw => "calendars",
            Self::RefractKw => "refract",
            Self::DirectKw => "direct",
            Self::AttributesKw => "attributes",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::DotDot => "..",
            Self::Colon => ":",
            Self::ColonColon => "::",
            Self::ColonEq => ":=",
            Self::Question => "?",
            Self::At => "@",
            Self::Hash => "#",
            Self::HashHash => "##",
            Self::Arrow => "->",
            Self::Eq => "=",
            Self::EqEq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Bang => "!",
            Self::BangDot => "!.",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::PlusPlus => "++",
            Self::MinusMinus => "--",
            Self::PlusEq => "+=",
            Self::MinusEq => "-=",
            Self::StarEq => "*=",
            Self::SlashEq => "/=",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for DrlSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_text() {
            Some(text) => write!(f, "'{text}'"),
            None => match self {
                Self::Ident => write!(f, "identifier"),
                Self::StringLit => write!(f, "string literal"),
                Self::IntLit | Self::FloatLit => write!(f, "number"),
                Self::Eof => write!(f, "end of file"),
                other => write!(f, "{other:?}"),
            },
        }
    }
}

impl From<DrlSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: DrlSyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}
