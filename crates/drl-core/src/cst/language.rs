//! Rowan language implementation for DRL
//!
//! This module implements the `rowan::Language` trait for DRL, which connects
//! our DrlSyntaxKind enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::DrlSyntaxKind;

/// Language implementation for DRL
///
/// This is a zero-sized type that implements `rowan::Language` to provide
/// the connection between our syntax kinds and Rowan's generic tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrlLanguage;

impl Language for DrlLanguage {
    type Kind = DrlSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        DrlSyntaxKind::from_raw(raw.0).unwrap_or(DrlSyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

impl DrlSyntaxKind {
    /// Convert a raw rowan kind back into a `DrlSyntaxKind`
    pub fn from_raw(raw: u16) -> Option<Self> {
        let kind = match raw {
            // Trivia (0-9)
            0 => DrlSyntaxKind::Whitespace,
            1 => DrlSyntaxKind::Newline,
            2 => DrlSyntaxKind::CommentLine,
            3 => DrlSyntaxKind::CommentBlock,

            // Keywords (10-99)
            10 => DrlSyntaxKind::PackageKw,
            11 => DrlSyntaxKind::ImportKw,
            12 => DrlSyntaxKind::GlobalKw,
            13 => DrlSyntaxKind::FunctionKw,
            14 => DrlSyntaxKind::RuleKw,
            15 => DrlSyntaxKind::QueryKw,
            16 => DrlSyntaxKind::DeclareKw,
            17 => DrlSyntaxKind::EndKw,
            18 => DrlSyntaxKind::WhenKw,
            19 => DrlSyntaxKind::ThenKw,
            20 => DrlSyntaxKind::ExtendsKw,
            21 => DrlSyntaxKind::StaticKw,
            22 => DrlSyntaxKind::TraitKw,

            // Conditional element keywords
            30 => DrlSyntaxKind::AndKw,
            31 => DrlSyntaxKind::OrKw,
            32 => DrlSyntaxKind::NotKw,
            33 => DrlSyntaxKind::ExistsKw,
            34 => DrlSyntaxKind::EvalKw,
            35 => DrlSyntaxKind::ForallKw,
            36 => DrlSyntaxKind::FromKw,
            37 => DrlSyntaxKind::AccumulateKw,
            38 => DrlSyntaxKind::CollectKw,
            39 => DrlSyntaxKind::OverKw,
            40 => DrlSyntaxKind::WindowKw,
            41 => DrlSyntaxKind::EntryPointKw,
            42 => DrlSyntaxKind::InKw,
            43 => DrlSyntaxKind::InstanceofKw,
            44 => DrlSyntaxKind::NewKw,

            // Operators spelled as words
            50 => DrlSyntaxKind::MatchesKw,
            51 => DrlSyntaxKind::ContainsKw,
            52 => DrlSyntaxKind::MemberOfKw,
            53 => DrlSyntaxKind::SoundslikeKw,
            54 => DrlSyntaxKind::ExcludesKw,
            55 => DrlSyntaxKind::StrKw,

            // Literal keywords
            60 => DrlSyntaxKind::TrueKw,
            61 => DrlSyntaxKind::FalseKw,
            62 => DrlSyntaxKind::NullKw,

            // Rule attribute keywords
            70 => DrlSyntaxKind::SalienceKw,
            71 => DrlSyntaxKind::NoLoopKw,
            72 => DrlSyntaxKind::AgendaGroupKw,
            73 => DrlSyntaxKind::RuleflowGroupKw,
            74 => DrlSyntaxKind::ActivationGroupKw,
            75 => DrlSyntaxKind::AutoFocusKw,
            76 => DrlSyntaxKind::LockOnActiveKw,
            77 => DrlSyntaxKind::DateEffectiveKw,
            78 => DrlSyntaxKind::DateExpiresKw,
            79 => DrlSyntaxKind::DialectKw,
            80 => DrlSyntaxKind::EnabledKw,
            81 => DrlSyntaxKind::DurationKw,
            82 => DrlSyntaxKind::TimerKw,
            83 => DrlSyntaxKind::CalendarsKw,
            84 => DrlSyntaxKind::RefractKw,
            85 => DrlSyntaxKind::DirectKw,
            86 => DrlSyntaxKind::AttributesKw,

            // Punctuation (100-159)
            100 => DrlSyntaxKind::LParen,
            101 => DrlSyntaxKind::RParen,
            102 => DrlSyntaxKind::LBrace,
            103 => DrlSyntaxKind::RBrace,
            104 => DrlSyntaxKind::LBracket,
            105 => DrlSyntaxKind::RBracket,
            106 => DrlSyntaxKind::Semicolon,
            107 => DrlSyntaxKind::Comma,
            108 => DrlSyntaxKind::Dot,
            109 => DrlSyntaxKind::DotDot,
            110 => DrlSyntaxKind::Colon,
            111 => DrlSyntaxKind::ColonColon,
            112 => DrlSyntaxKind::ColonEq,
            113 => DrlSyntaxKind::Question,
            114 => DrlSyntaxKind::At,
            115 => DrlSyntaxKind::Hash,
            116 => DrlSyntaxKind::HashHash,
            117 => DrlSyntaxKind::Arrow,
            118 => DrlSyntaxKind::Eq,
            119 => DrlSyntaxKind::EqEq,
            120 => DrlSyntaxKind::Neq,
            121 => DrlSyntaxKind::Lt,
            122 => DrlSyntaxKind::Gt,
            123 => DrlSyntaxKind::LtEq,
            124 => DrlSyntaxKind::GtEq,
            125 => DrlSyntaxKind::AmpAmp,
            126 => DrlSyntaxKind::PipePipe,
            127 => DrlSyntaxKind::Amp,
            128 => DrlSyntaxKind::Pipe,
            129 => DrlSyntaxKind::Caret,
            130 => DrlSyntaxKind::Tilde,
            131 => DrlSyntaxKind::Bang,
            132 => DrlSyntaxKind::BangDot,
            133 => DrlSyntaxKind::Plus,
            134 => DrlSyntaxKind::Minus,
            135 => DrlSyntaxKind::Star,
            136 => DrlSyntaxKind::Slash,
            137 => DrlSyntaxKind::Percent,
            138 => DrlSyntaxKind::PlusPlus,
            139 => DrlSyntaxKind::MinusMinus,
            140 => DrlSyntaxKind::PlusEq,
            141 => DrlSyntaxKind::MinusEq,
            142 => DrlSyntaxKind::StarEq,
            143 => DrlSyntaxKind::SlashEq,

            // Identifiers and literals (160-199)
            160 => DrlSyntaxKind::Ident,
            161 => DrlSyntaxKind::StringLit,
            162 => DrlSyntaxKind::IntLit,
            163 => DrlSyntaxKind::FloatLit,
            164 => DrlSyntaxKind::ActionText,
            165 => DrlSyntaxKind::Verbatim,
            180 => DrlSyntaxKind::Error,
            181 => DrlSyntaxKind::Eof,

            // Declarations (200-239)
            200 => DrlSyntaxKind::CompilationUnit,
            201 => DrlSyntaxKind::PackageDecl,
            202 => DrlSyntaxKind::ImportDecl,
            203 => DrlSyntaxKind::GlobalDecl,
            204 => DrlSyntaxKind::FunctionDecl,
            205 => DrlSyntaxKind::FunctionBody,
            206 => DrlSyntaxKind::ParameterList,
            207 => DrlSyntaxKind::Parameter,
            208 => DrlSyntaxKind::QueryDecl,
            209 => DrlSyntaxKind::DeclareDecl,
            210 => DrlSyntaxKind::FieldDecl,
            211 => DrlSyntaxKind::Annotation,
            212 => DrlSyntaxKind::RuleDecl,
            213 => DrlSyntaxKind::RuleName,
            214 => DrlSyntaxKind::RuleExtends,
            215 => DrlSyntaxKind::AttributeList,
            216 => DrlSyntaxKind::Attribute,
            217 => DrlSyntaxKind::AttributeValue,
            218 => DrlSyntaxKind::WhenClause,
            219 => DrlSyntaxKind::ThenClause,
            220 => DrlSyntaxKind::ActionBlock,
            221 => DrlSyntaxKind::QualifiedName,
            222 => DrlSyntaxKind::TypeRef,

            // Conditional elements (240-279)
            240 => DrlSyntaxKind::LhsOr,
            241 => DrlSyntaxKind::LhsAnd,
            242 => DrlSyntaxKind::LhsNot,
            243 => DrlSyntaxKind::LhsExists,
            244 => DrlSyntaxKind::LhsEval,
            245 => DrlSyntaxKind::LhsForall,
            246 => DrlSyntaxKind::LhsParen,
            247 => DrlSyntaxKind::Pattern,
            248 => DrlSyntaxKind::Binding,
            249 => DrlSyntaxKind::Constraint,
            250 => DrlSyntaxKind::FromClause,
            251 => DrlSyntaxKind::AccumulateClause,
            252 => DrlSyntaxKind::CollectClause,
            253 => DrlSyntaxKind::EntryPoint,
            254 => DrlSyntaxKind::WindowClause,

            // Expressions (280-319)
            280 => DrlSyntaxKind::BinaryExpr,
            281 => DrlSyntaxKind::RelationalExpr,
            282 => DrlSyntaxKind::HalfConstraint,
            283 => DrlSyntaxKind::UnaryExpr,
            284 => DrlSyntaxKind::ParenExpr,
            285 => DrlSyntaxKind::Literal,
            286 => DrlSyntaxKind::NameRef,
            287 => DrlSyntaxKind::FieldAccess,
            288 => DrlSyntaxKind::MethodCall,
            289 => DrlSyntaxKind::ArgList,
            290 => DrlSyntaxKind::IndexExpr,
            291 => DrlSyntaxKind::TernaryExpr,
            292 => DrlSyntaxKind::CastExpr,
            293 => DrlSyntaxKind::InlineCast,
            294 => DrlSyntaxKind::ArrayInit,
            295 => DrlSyntaxKind::NewExpr,
            296 => DrlSyntaxKind::Operator,
            297 => DrlSyntaxKind::OperatorParams,

            _ => return None,
        };
        Some(kind)
    }
}
