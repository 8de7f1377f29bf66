//! Typed AST layer over the CST
//!
//! Thin, zero-cost wrappers around `DrlSyntaxNode`. Each wrapper checks the
//! node kind in `cast()` and exposes accessors for the parts recipes need.
//!
//! # Example
//!
//! ```rust
//! use drl_core::cst::ast::{AstNode, CompilationUnit};
//! use drl_core::cst::parse_drl;
//!
//! let (cst, _, _) = parse_drl("rule \"Adults\" salience 10 when Person( age > 18 ) then end");
//! let unit = CompilationUnit::cast(cst).unwrap();
//! let rule = unit.rules().next().unwrap();
//!
//! assert_eq!(rule.name().unwrap(), "Adults");
//! assert_eq!(rule.attribute("salience").unwrap().value().unwrap(), "10");
//! ```

use super::{DrlSyntaxKind, DrlSyntaxNode, DrlSyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: DrlSyntaxKind) -> bool;
    fn cast(node: DrlSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &DrlSyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: DrlSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: DrlSyntaxKind) -> bool {
                kind == DrlSyntaxKind::$kind
            }

            fn cast(node: DrlSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &DrlSyntaxNode {
                &self.syntax
            }
        }
    };
}

fn child_of_kind(parent: &DrlSyntaxNode, kind: DrlSyntaxKind) -> Option<DrlSyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

fn token_of_kind(parent: &DrlSyntaxNode, kind: DrlSyntaxKind) -> Option<DrlSyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Direct significant tokens of a node
fn significant_tokens(parent: &DrlSyntaxNode) -> impl Iterator<Item = DrlSyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

fn qualified_name_text(parent: &DrlSyntaxNode) -> Option<String> {
    child_of_kind(parent, DrlSyntaxKind::QualifiedName).map(|n| n.text().to_string())
}

fn type_ref_text(parent: &DrlSyntaxNode) -> Option<String> {
    child_of_kind(parent, DrlSyntaxKind::TypeRef).map(|n| n.text().to_string())
}

/// Strip the quotes of a string literal; other text is returned as is
fn unquote(text: &str) -> String {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

/// Name of a `RuleName` child, unquoted
fn decl_name(parent: &DrlSyntaxNode) -> Option<String> {
    let name = child_of_kind(parent, DrlSyntaxKind::RuleName)?;
    significant_tokens(&name).next().map(|t| unquote(t.text()))
}

// ============================================================================
// Compilation unit
// ============================================================================

ast_node!(
    /// Root of a DRL file
    CompilationUnit,
    CompilationUnit
);

impl CompilationUnit {
    pub fn package(&self) -> Option<PackageDecl> {
        self.syntax.children().find_map(PackageDecl::cast)
    }

    pub fn imports(&self) -> impl Iterator<Item = ImportDecl> {
        self.syntax.children().filter_map(ImportDecl::cast)
    }

    pub fn globals(&self) -> impl Iterator<Item = GlobalDecl> {
        self.syntax.children().filter_map(GlobalDecl::cast)
    }

    pub fn functions(&self) -> impl Iterator<Item = FunctionDecl> {
        self.syntax.children().filter_map(FunctionDecl::cast)
    }

    pub fn queries(&self) -> impl Iterator<Item = QueryDecl> {
        self.syntax.children().filter_map(QueryDecl::cast)
    }

    pub fn declares(&self) -> impl Iterator<Item = DeclareDecl> {
        self.syntax.children().filter_map(DeclareDecl::cast)
    }

    pub fn rules(&self) -> impl Iterator<Item = RuleDecl> {
        self.syntax.children().filter_map(RuleDecl::cast)
    }

    /// Unparseable top-level regions
    pub fn errors(&self) -> impl Iterator<Item = DrlSyntaxNode> {
        self.syntax
            .children()
            .filter(|n| n.kind() == DrlSyntaxKind::Error)
    }
}

// ============================================================================
// Header declarations
// ============================================================================

ast_node!(
    /// `package a.b.c;`
    PackageDecl,
    PackageDecl
);

impl PackageDecl {
    pub fn name(&self) -> Option<String> {
        qualified_name_text(&self.syntax)
    }
}

ast_node!(
    /// `import [static|function] a.b.C[.*];`
    ImportDecl,
    ImportDecl
);

impl ImportDecl {
    /// Imported path, including a trailing `.*`
    pub fn path(&self) -> Option<String> {
        let mut path = qualified_name_text(&self.syntax)?;
        if self.is_wildcard() {
            path.push_str(".*");
        }
        Some(path)
    }

    pub fn is_static(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::StaticKw).is_some()
    }

    pub fn is_function(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::FunctionKw).is_some()
    }

    pub fn is_wildcard(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::Star).is_some()
    }
}

ast_node!(
    /// `global Type name;`
    GlobalDecl,
    GlobalDecl
);

impl GlobalDecl {
    pub fn type_name(&self) -> Option<String> {
        type_ref_text(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        significant_tokens(&self.syntax)
            .filter(|t| t.kind() != DrlSyntaxKind::Semicolon)
            .last()
            .filter(|t| t.kind() != DrlSyntaxKind::GlobalKw)
            .map(|t| t.text().to_string())
    }
}

ast_node!(
    /// `function Type name(params) { body }`
    FunctionDecl,
    FunctionDecl
);

impl FunctionDecl {
    pub fn return_type(&self) -> Option<String> {
        type_ref_text(&self.syntax)
    }

    pub fn name(&self) -> Option<String> {
        significant_tokens(&self.syntax)
            .find(|t| t.kind() != DrlSyntaxKind::FunctionKw)
            .map(|t| t.text().to_string())
    }

    /// Parameter names in declaration order
    pub fn parameters(&self) -> Vec<String> {
        parameter_names(&self.syntax)
    }

    /// Body text including the braces
    pub fn body(&self) -> Option<String> {
        child_of_kind(&self.syntax, DrlSyntaxKind::FunctionBody).map(|n| n.text().to_string())
    }
}

fn parameter_names(parent: &DrlSyntaxNode) -> Vec<String> {
    child_of_kind(parent, DrlSyntaxKind::ParameterList)
        .map(|list| {
            list.children()
                .filter(|n| n.kind() == DrlSyntaxKind::Parameter)
                .filter_map(|param| {
                    // `Type name` keeps the name as a token; a lone name is a TypeRef
                    significant_tokens(&param)
                        .last()
                        .map(|t| t.text().to_string())
                        .or_else(|| type_ref_text(&param))
                })
                .collect()
        })
        .unwrap_or_default()
}

ast_node!(
    /// `query "name" (params) patterns end`
    QueryDecl,
    QueryDecl
);

impl QueryDecl {
    pub fn name(&self) -> Option<String> {
        decl_name(&self.syntax)
    }

    pub fn parameters(&self) -> Vec<String> {
        parameter_names(&self.syntax)
    }

    pub fn patterns(&self) -> impl Iterator<Item = Pattern> {
        self.syntax.descendants().filter_map(Pattern::cast)
    }
}

ast_node!(
    /// `declare Type ... end`
    DeclareDecl,
    DeclareDecl
);

impl DeclareDecl {
    pub fn name(&self) -> Option<String> {
        qualified_name_text(&self.syntax)
    }

    pub fn is_trait(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::TraitKw).is_some()
    }

    pub fn supertypes(&self) -> Vec<String> {
        self.syntax
            .children()
            .filter(|n| n.kind() == DrlSyntaxKind::QualifiedName)
            .skip(1)
            .map(|n| n.text().to_string())
            .collect()
    }

    /// `(name, type)` of every field
    pub fn fields(&self) -> Vec<(String, String)> {
        self.syntax
            .children()
            .filter(|n| n.kind() == DrlSyntaxKind::FieldDecl)
            .filter_map(|field| {
                let name = significant_tokens(&field).next()?.text().to_string();
                Some((name, type_ref_text(&field)?))
            })
            .collect()
    }
}

// ============================================================================
// Rules
// ============================================================================

ast_node!(
    /// `rule "name" attributes when ... then ... end`
    RuleDecl,
    RuleDecl
);

impl RuleDecl {
    /// Rule name without quotes
    pub fn name(&self) -> Option<String> {
        decl_name(&self.syntax)
    }

    /// Name of the rule this one extends
    pub fn parent(&self) -> Option<String> {
        let extends = child_of_kind(&self.syntax, DrlSyntaxKind::RuleExtends)?;
        significant_tokens(&extends)
            .find(|t| t.kind() != DrlSyntaxKind::ExtendsKw)
            .map(|t| unquote(t.text()))
    }

    pub fn attributes(&self) -> impl Iterator<Item = Attribute> {
        child_of_kind(&self.syntax, DrlSyntaxKind::AttributeList)
            .into_iter()
            .flat_map(|list| list.children().filter_map(Attribute::cast))
    }

    /// First attribute with the given key text (`"no-loop"`, `"salience"`, ...)
    pub fn attribute(&self, key: &str) -> Option<Attribute> {
        self.attributes().find(|a| a.key().as_deref() == Some(key))
    }

    pub fn when_clause(&self) -> Option<WhenClause> {
        self.syntax.children().find_map(WhenClause::cast)
    }

    pub fn then_clause(&self) -> Option<ThenClause> {
        self.syntax.children().find_map(ThenClause::cast)
    }
}

ast_node!(
    /// A rule attribute such as `salience 10` or `no-loop`
    Attribute,
    Attribute
);

impl Attribute {
    pub fn key_token(&self) -> Option<DrlSyntaxToken> {
        significant_tokens(&self.syntax).next()
    }

    pub fn key(&self) -> Option<String> {
        self.key_token().map(|t| t.text().to_string())
    }

    /// False for an identifier key that is not a DRL attribute
    pub fn is_known(&self) -> bool {
        self.key_token()
            .is_some_and(|t| t.kind().is_attribute_keyword())
    }

    /// Value text as written: `10`, `"group"`, `(int: 1s)`, `"a", "b"`
    pub fn value(&self) -> Option<String> {
        child_of_kind(&self.syntax, DrlSyntaxKind::AttributeValue).map(|n| n.text().to_string())
    }
}

ast_node!(
    /// `when` followed by the conditional elements
    WhenClause,
    WhenClause
);

impl WhenClause {
    /// Top-level conditional elements (patterns, `not`, `or`, ...)
    pub fn elements(&self) -> impl Iterator<Item = DrlSyntaxNode> {
        self.syntax.children().filter(|n| n.kind() != DrlSyntaxKind::Error)
    }

    /// Every pattern of the clause, including nested ones
    pub fn patterns(&self) -> impl Iterator<Item = Pattern> {
        self.syntax.descendants().filter_map(Pattern::cast)
    }
}

ast_node!(
    /// `$p : Person( age > 18 ) from $list`
    Pattern,
    Pattern
);

impl Pattern {
    /// Bound variable name (`$p`)
    pub fn binding(&self) -> Option<String> {
        binding_name(&self.syntax)
    }

    pub fn type_name(&self) -> Option<String> {
        qualified_name_text(&self.syntax)
    }

    /// `?Query(...)` calls a query without waiting for results
    pub fn is_query_call(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::Question).is_some()
    }

    pub fn constraints(&self) -> impl Iterator<Item = Constraint> {
        self.syntax.children().filter_map(Constraint::cast)
    }

    pub fn from_clause(&self) -> Option<DrlSyntaxNode> {
        child_of_kind(&self.syntax, DrlSyntaxKind::FromClause)
    }
}

fn binding_name(parent: &DrlSyntaxNode) -> Option<String> {
    let binding = child_of_kind(parent, DrlSyntaxKind::Binding)?;
    significant_tokens(&binding)
        .next()
        .map(|t| t.text().to_string())
}

ast_node!(
    /// One comma separated constraint of a pattern
    Constraint,
    Constraint
);

impl Constraint {
    pub fn binding(&self) -> Option<String> {
        binding_name(&self.syntax)
    }

    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(
    /// `then` followed by the consequence
    ThenClause,
    ThenClause
);

impl ThenClause {
    pub fn action(&self) -> Option<ActionBlock> {
        self.syntax.children().find_map(ActionBlock::cast)
    }
}

ast_node!(
    /// Opaque consequence code
    ActionBlock,
    ActionBlock
);

impl ActionBlock {
    /// Action code without the surrounding trivia; empty for an empty consequence
    pub fn text(&self) -> String {
        token_of_kind(&self.syntax, DrlSyntaxKind::ActionText)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::ActionText).is_none()
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Any constraint expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    syntax: DrlSyntaxNode,
}

impl AstNode for Expr {
    fn can_cast(kind: DrlSyntaxKind) -> bool {
        matches!(
            kind,
            DrlSyntaxKind::BinaryExpr
                | DrlSyntaxKind::RelationalExpr
                | DrlSyntaxKind::HalfConstraint
                | DrlSyntaxKind::UnaryExpr
                | DrlSyntaxKind::ParenExpr
                | DrlSyntaxKind::Literal
                | DrlSyntaxKind::NameRef
                | DrlSyntaxKind::FieldAccess
                | DrlSyntaxKind::MethodCall
                | DrlSyntaxKind::IndexExpr
                | DrlSyntaxKind::TernaryExpr
                | DrlSyntaxKind::CastExpr
                | DrlSyntaxKind::InlineCast
                | DrlSyntaxKind::ArrayInit
                | DrlSyntaxKind::NewExpr
        )
    }

    fn cast(node: DrlSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &DrlSyntaxNode {
        &self.syntax
    }
}

impl Expr {
    pub fn kind(&self) -> DrlSyntaxKind {
        self.syntax.kind()
    }

    pub fn as_relational(&self) -> Option<RelationalExpr> {
        RelationalExpr::cast(self.syntax.clone())
    }

    pub fn as_half_constraint(&self) -> Option<HalfConstraint> {
        HalfConstraint::cast(self.syntax.clone())
    }

    /// Operator token of a binary expression (`||`, `&&`, `+`, ...)
    pub fn binary_operator(&self) -> Option<DrlSyntaxToken> {
        if self.kind() != DrlSyntaxKind::BinaryExpr {
            return None;
        }
        significant_tokens(&self.syntax).next()
    }

    /// Operand expressions in source order
    pub fn operands(&self) -> impl Iterator<Item = Expr> {
        self.syntax.children().filter_map(Expr::cast)
    }
}

ast_node!(
    /// `left <operator> right`
    RelationalExpr,
    RelationalExpr
);

impl RelationalExpr {
    pub fn lhs(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn operator(&self) -> Option<Operator> {
        self.syntax.children().find_map(Operator::cast)
    }

    /// Right operand: an expression, an `ArgList` for `in`, or a `TypeRef`
    pub fn rhs(&self) -> Option<DrlSyntaxNode> {
        self.syntax
            .children()
            .skip_while(|n| n.kind() != DrlSyntaxKind::Operator)
            .nth(1)
    }
}

ast_node!(
    /// `<operator> right` without a left operand, after `||` or `&&`
    HalfConstraint,
    HalfConstraint
);

impl HalfConstraint {
    pub fn operator(&self) -> Option<Operator> {
        self.syntax.children().find_map(Operator::cast)
    }

    pub fn rhs(&self) -> Option<DrlSyntaxNode> {
        self.syntax
            .children()
            .find(|n| n.kind() != DrlSyntaxKind::Operator)
    }
}

ast_node!(
    /// Operator of a relational expression: `==`, `not contains`, `##custom[params]`
    Operator,
    Operator
);

impl Operator {
    pub fn is_negated(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::NotKw).is_some()
    }

    /// Has an explicit `##` custom operator prefix
    pub fn is_prefixed(&self) -> bool {
        token_of_kind(&self.syntax, DrlSyntaxKind::HashHash).is_some()
    }

    /// The operator token itself, without `not` and `##`
    pub fn token(&self) -> Option<DrlSyntaxToken> {
        significant_tokens(&self.syntax)
            .find(|t| !matches!(t.kind(), DrlSyntaxKind::NotKw | DrlSyntaxKind::HashHash))
    }

    pub fn name(&self) -> Option<String> {
        self.token().map(|t| t.text().to_string())
    }

    /// Operator written as a plain identifier (built-in temporal or custom)
    pub fn is_identifier(&self) -> bool {
        self.token().is_some_and(|t| t.kind() == DrlSyntaxKind::Ident)
    }

    pub fn params(&self) -> Option<String> {
        child_of_kind(&self.syntax, DrlSyntaxKind::OperatorParams).map(|n| n.text().to_string())
    }
}
