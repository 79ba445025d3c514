//! Lowers the parser's recursive `ast_types::Program` tree into an
//! arena-addressed [`super::Arena`]. This is the seam between the
//! out-of-scope parsing boundary and the in-scope Node model (§3/§4.1):
//! everything above this module only ever sees `NodeId`s.

use crate::ast::{
    Arena, AssignmentOperator, BinaryOperator, JsDocInfo, LiteralValue, LogicalOperator,
    MethodKind, NodeId, NodeKind, PropertyKind, SourceId, UnaryOperator, UpdateOperator, VarKind,
};
use crate::parser::ast_types as p;

pub struct Builder {
    arena: Arena,
    source: SourceId,
}

impl Builder {
    pub fn new(source: SourceId) -> Self {
        Self { arena: Arena::new(), source }
    }

    /// Lower a whole program and set it as the arena's root.
    pub fn build(mut self, program: &p::Program) -> (Arena, NodeId) {
        let body = program.body.iter().map(|s| self.lower_statement(s)).collect();
        let root = self.alloc(NodeKind::Program { body });
        self.arena.set_root(root);
        (self.arena, root)
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.arena.alloc(kind, self.source)
    }

    fn lower_statement(&mut self, stmt: &p::Statement) -> NodeId {
        match stmt {
            p::Statement::VariableDeclaration { declarations, kind } => {
                let kind = lower_var_kind(kind);
                let declarators = declarations.iter().map(|d| self.lower_declarator(d)).collect();
                self.alloc(NodeKind::VariableDeclaration { kind, declarators })
            }
            p::Statement::FunctionDeclaration { id, params, body, is_async, is_generator } => {
                let id = id.as_ref().map(|i| self.lower_identifier(i));
                let params = params.iter().map(|pt| self.lower_pattern(pt)).collect();
                let body = self.lower_block(body);
                self.alloc(NodeKind::FunctionDeclaration {
                    id,
                    params,
                    body,
                    is_async: *is_async,
                    is_generator: *is_generator,
                })
            }
            p::Statement::ClassDeclaration { id, super_class, body } => {
                let id = id.as_ref().map(|i| self.lower_identifier(i));
                let superclass = super_class.as_ref().map(|e| self.lower_expression(e));
                let body = body.body.iter().map(|e| self.lower_class_element(e)).collect();
                self.alloc(NodeKind::ClassDeclaration { id, superclass, body })
            }
            p::Statement::ExpressionStatement { expression } => {
                let expression = self.lower_expression(expression);
                self.alloc(NodeKind::ExpressionStatement { expression })
            }
            p::Statement::BlockStatement { body } => {
                let body = body.iter().map(|s| self.lower_statement(s)).collect();
                self.alloc(NodeKind::BlockStatement { body })
            }
            p::Statement::ReturnStatement { argument } => {
                let argument = argument.as_ref().map(|e| self.lower_expression(e));
                self.alloc(NodeKind::ReturnStatement { argument })
            }
            p::Statement::IfStatement { test, consequent, alternate } => {
                let test = self.lower_expression(test);
                let consequent = self.lower_statement(consequent);
                let alternate = alternate.as_ref().map(|s| self.lower_statement(s));
                self.alloc(NodeKind::IfStatement { test, consequent, alternate })
            }
            p::Statement::WhileStatement { test, body } => {
                let test = self.lower_expression(test);
                let body = self.lower_statement(body);
                self.alloc(NodeKind::WhileStatement { test, body })
            }
            p::Statement::DoWhileStatement { body, test } => {
                let body = self.lower_statement(body);
                let test = self.lower_expression(test);
                self.alloc(NodeKind::DoWhileStatement { body, test })
            }
            p::Statement::ForStatement { init, test, update, body } => {
                let init = init.as_ref().map(|i| self.lower_for_init(i));
                let test = test.as_ref().map(|e| self.lower_expression(e));
                let update = update.as_ref().map(|e| self.lower_expression(e));
                let body = self.lower_statement(body);
                self.alloc(NodeKind::ForStatement { init, test, update, body })
            }
            p::Statement::ForInStatement { left, right, body } => {
                let (left, is_decl) = self.lower_for_left(left);
                let right = self.lower_expression(right);
                let body = self.lower_statement(body);
                self.alloc(NodeKind::ForInStatement { left, right, body, is_decl })
            }
            p::Statement::ForOfStatement { left, right, body } => {
                let (left, is_decl) = self.lower_for_left(left);
                let right = self.lower_expression(right);
                let body = self.lower_statement(body);
                self.alloc(NodeKind::ForOfStatement { left, right, body, is_decl })
            }
            p::Statement::SwitchStatement { discriminant, cases } => {
                let discriminant = self.lower_expression(discriminant);
                let cases = cases.iter().map(|c| self.lower_switch_case(c)).collect();
                self.alloc(NodeKind::SwitchStatement { discriminant, cases })
            }
            p::Statement::TryStatement { block, handler, finalizer } => {
                let block = self.lower_statement(block);
                let handler = handler.as_ref().map(|h| self.lower_catch(h));
                let finalizer = finalizer.as_ref().map(|f| self.lower_statement(f));
                self.alloc(NodeKind::TryStatement { block, handler, finalizer })
            }
            p::Statement::ThrowStatement { argument } => {
                let argument = self.lower_expression(argument);
                self.alloc(NodeKind::ThrowStatement { argument })
            }
            p::Statement::BreakStatement { label } => {
                self.alloc(NodeKind::BreakStatement { label: label.clone() })
            }
            p::Statement::ContinueStatement { label } => {
                self.alloc(NodeKind::ContinueStatement { label: label.clone() })
            }
            p::Statement::LabeledStatement { label, body } => {
                let body = self.lower_statement(body);
                self.alloc(NodeKind::LabeledStatement { label: label.clone(), body })
            }
            p::Statement::EmptyStatement => self.alloc(NodeKind::EmptyStatement),
            p::Statement::ImportDeclaration { specifiers, source } => {
                let specifiers = specifiers.iter().map(|s| self.lower_import_specifier(s)).collect();
                self.alloc(NodeKind::ImportDeclaration { specifiers, source: source.value.clone() })
            }
            p::Statement::ExportNamedDeclaration { declaration, specifiers, .. } => {
                let declaration = declaration.as_ref().map(|d| self.lower_statement(d));
                let specifiers = specifiers.iter().map(|s| self.lower_export_specifier(s)).collect();
                self.alloc(NodeKind::ExportNamedDeclaration { declaration, specifiers })
            }
        }
    }

    fn lower_block(&mut self, block: &p::BlockStatement) -> NodeId {
        let body = block.body.iter().map(|s| self.lower_statement(s)).collect();
        self.alloc(NodeKind::BlockStatement { body })
    }

    fn lower_declarator(&mut self, d: &p::VariableDeclarator) -> NodeId {
        let id = self.lower_pattern(&d.id);
        let init = d.init.as_ref().map(|e| self.lower_expression(e));
        self.alloc(NodeKind::VariableDeclarator { id, init })
    }

    fn lower_for_init(&mut self, init: &p::ForInit) -> NodeId {
        match init {
            p::ForInit::VariableDeclaration { declarations, kind } => {
                let kind = lower_var_kind(kind);
                let declarators = declarations.iter().map(|d| self.lower_declarator(d)).collect();
                self.alloc(NodeKind::VariableDeclaration { kind, declarators })
            }
            p::ForInit::Expression(e) => self.lower_expression(e),
        }
    }

    /// Returns the lowered left-hand side plus whether it was a
    /// declaration (`for (let x in ...)`) as opposed to a bare target
    /// (`for (x in ...)`) — the scope builder needs this to know whether
    /// the binding is fresh per §4.1's scope-root rules.
    fn lower_for_left(&mut self, left: &p::ForInit) -> (NodeId, bool) {
        match left {
            p::ForInit::VariableDeclaration { declarations, kind } => {
                let kind = lower_var_kind(kind);
                let declarators = declarations.iter().map(|d| self.lower_declarator(d)).collect();
                (self.alloc(NodeKind::VariableDeclaration { kind, declarators }), true)
            }
            p::ForInit::Expression(e) => (self.lower_expression(e), false),
        }
    }

    fn lower_switch_case(&mut self, case: &p::SwitchCase) -> NodeId {
        let test = case.test.as_ref().map(|e| self.lower_expression(e));
        let consequent = case.consequent.iter().map(|s| self.lower_statement(s)).collect();
        self.alloc(NodeKind::SwitchCase { test, consequent })
    }

    fn lower_catch(&mut self, catch: &p::CatchClause) -> NodeId {
        let param = catch.param.as_ref().map(|pt| self.lower_pattern(pt));
        let body = self.lower_block(&catch.body);
        self.alloc(NodeKind::CatchClause { param, body })
    }

    fn lower_class_element(&mut self, elem: &p::ClassElement) -> NodeId {
        match elem {
            p::ClassElement::PropertyDefinition { key, value, is_static, .. } => {
                let key = self.lower_property_key(key);
                let value = value.as_ref().map(|e| self.lower_expression(e));
                self.alloc(NodeKind::PropertyDefinition { key, value, is_static: *is_static })
            }
            p::ClassElement::MethodDefinition { key, value, kind, is_static, .. } => {
                let key = self.lower_property_key(key);
                let id = value.id.as_ref().map(|i| self.lower_identifier(i));
                let params = value.params.iter().map(|pt| self.lower_pattern(pt)).collect();
                let body = self.lower_block(&value.body);
                let func = self.alloc(NodeKind::FunctionExpression {
                    id,
                    params,
                    body,
                    is_async: value.is_async,
                    is_generator: value.is_generator,
                });
                let kind = match kind {
                    p::MethodKind::Constructor => MethodKind::Constructor,
                    p::MethodKind::Method => MethodKind::Method,
                    p::MethodKind::Get => MethodKind::Get,
                    p::MethodKind::Set => MethodKind::Set,
                };
                self.alloc(NodeKind::MethodDefinition { key, value: func, kind, is_static: *is_static })
            }
        }
    }

    fn lower_import_specifier(&mut self, spec: &p::ImportSpecifier) -> NodeId {
        let (imported, local) = match spec {
            p::ImportSpecifier::ImportDefaultSpecifier { local } => ("default".to_string(), local.name.clone()),
            p::ImportSpecifier::ImportNamespaceSpecifier { local } => ("*".to_string(), local.name.clone()),
            p::ImportSpecifier::ImportSpecifier { imported, local } => (imported.name.clone(), local.name.clone()),
        };
        self.alloc(NodeKind::ImportSpecifier { imported, local })
    }

    fn lower_export_specifier(&mut self, spec: &p::ExportSpecifier) -> NodeId {
        let p::ExportSpecifier::ExportSpecifier { local, exported } = spec;
        self.alloc(NodeKind::ExportSpecifier { local: local.name.clone(), exported: exported.name.clone() })
    }

    fn lower_property_key(&mut self, key: &p::PropertyKey) -> NodeId {
        match key {
            p::PropertyKey::Identifier(id) => self.lower_identifier(id),
            p::PropertyKey::Literal(lit) => self.lower_literal(lit),
            p::PropertyKey::PrivateName(name) => {
                self.alloc(NodeKind::Identifier { name: format!("#{}", name.name) })
            }
        }
    }

    fn lower_identifier(&mut self, id: &p::Identifier) -> NodeId {
        self.alloc(NodeKind::Identifier { name: id.name.clone() })
    }

    fn lower_literal(&mut self, lit: &p::Literal) -> NodeId {
        let value = match lit {
            p::Literal::String(s) => LiteralValue::String(s.value.clone()),
            p::Literal::Number(n) => LiteralValue::Number(n.value),
            p::Literal::Boolean(b) => LiteralValue::Boolean(b.value),
            p::Literal::Null => LiteralValue::Null,
            p::Literal::RegExp(r) => LiteralValue::RegExp { pattern: r.pattern.clone(), flags: r.flags.clone() },
        };
        self.alloc(NodeKind::Literal(value))
    }

    fn lower_expression(&mut self, expr: &p::Expression) -> NodeId {
        match expr {
            p::Expression::Identifier(id) => self.lower_identifier(id),
            p::Expression::Literal(lit) => self.lower_literal(lit),
            p::Expression::ThisExpression => self.alloc(NodeKind::ThisExpression),
            p::Expression::BinaryExpression { left, operator, right } => {
                let l = self.lower_expression(left);
                let r = self.lower_expression(right);
                if let Some(op) = lower_logical_operator(operator) {
                    self.alloc(NodeKind::LogicalExpression { operator: op, left: l, right: r })
                } else {
                    let op = lower_binary_operator(operator);
                    self.alloc(NodeKind::BinaryExpression { operator: op, left: l, right: r })
                }
            }
            p::Expression::UnaryExpression { operator, argument, .. } => {
                let argument = self.lower_expression(argument);
                let operator = lower_unary_operator(operator);
                self.alloc(NodeKind::UnaryExpression { operator, argument })
            }
            p::Expression::AssignmentExpression { left, operator, right } => {
                let left = self.lower_expression(left);
                let right = self.lower_expression(right);
                let operator = lower_assignment_operator(operator);
                self.alloc(NodeKind::AssignmentExpression { operator, left, right })
            }
            p::Expression::UpdateExpression { operator, argument, prefix } => {
                let argument = self.lower_expression(argument);
                let operator = match operator {
                    p::UpdateOperator::Increment => UpdateOperator::Increment,
                    p::UpdateOperator::Decrement => UpdateOperator::Decrement,
                };
                self.alloc(NodeKind::UpdateExpression { operator, argument, prefix: *prefix })
            }
            p::Expression::CallExpression { callee, arguments } => {
                let callee = self.lower_expression(callee);
                let arguments = arguments.iter().map(|a| self.lower_expression(a)).collect();
                self.alloc(NodeKind::CallExpression { callee, arguments })
            }
            p::Expression::NewExpression { callee, arguments } => {
                let callee = self.lower_expression(callee);
                let arguments = arguments.iter().map(|a| self.lower_expression(a)).collect();
                self.alloc(NodeKind::NewExpression { callee, arguments })
            }
            p::Expression::MemberExpression { object, property, computed } => {
                let object = self.lower_expression(object);
                let property = self.lower_expression(property);
                self.alloc(NodeKind::MemberExpression { object, property, computed: *computed })
            }
            p::Expression::FunctionExpression(func) => {
                let id = func.id.as_ref().map(|i| self.lower_identifier(i));
                let params = func.params.iter().map(|pt| self.lower_pattern(pt)).collect();
                let body = self.lower_block(&func.body);
                self.alloc(NodeKind::FunctionExpression {
                    id,
                    params,
                    body,
                    is_async: func.is_async,
                    is_generator: func.is_generator,
                })
            }
            p::Expression::ArrowFunctionExpression { params, body, is_async } => {
                let params = params.iter().map(|pt| self.lower_pattern(pt)).collect();
                let (body, is_expression_body) = match body {
                    p::ArrowFunctionBody::BlockStatement(b) => (self.lower_block(b), false),
                    p::ArrowFunctionBody::Expression(e) => (self.lower_expression(e), true),
                };
                self.alloc(NodeKind::ArrowFunctionExpression {
                    params,
                    body,
                    is_async: *is_async,
                    is_expression_body,
                })
            }
            p::Expression::ObjectExpression { properties } => {
                let properties = properties
                    .iter()
                    .filter_map(|prop| self.lower_object_property(prop))
                    .collect();
                self.alloc(NodeKind::ObjectExpression { properties })
            }
            p::Expression::ArrayExpression { elements } => {
                let elements = elements
                    .iter()
                    .map(|e| e.as_ref().map(|e| self.lower_expression(e)))
                    .collect();
                self.alloc(NodeKind::ArrayExpression { elements })
            }
            p::Expression::TemplateLiteral { quasis, expressions } => {
                let quasis = quasis.iter().map(|q| q.value.clone()).collect();
                let expressions = expressions.iter().map(|e| self.lower_expression(e)).collect();
                self.alloc(NodeKind::TemplateLiteral { quasis, expressions })
            }
            p::Expression::ConditionalExpression { test, consequent, alternate } => {
                let test = self.lower_expression(test);
                let consequent = self.lower_expression(consequent);
                let alternate = self.lower_expression(alternate);
                self.alloc(NodeKind::ConditionalExpression { test, consequent, alternate })
            }
        }
    }

    /// `SpreadElement` has no arena representation yet (spread call
    /// arguments and object spread are not modeled, matching the
    /// parser's own current limits); such properties are skipped.
    fn lower_object_property(&mut self, prop: &p::ObjectProperty) -> Option<NodeId> {
        match prop {
            p::ObjectProperty::Property { key, value, kind, computed, .. } => {
                let key = self.lower_property_key(key);
                let value = self.lower_expression(value);
                let kind = match kind {
                    p::PropertyKind::Init => PropertyKind::Init,
                    p::PropertyKind::Get => PropertyKind::Get,
                    p::PropertyKind::Set => PropertyKind::Set,
                };
                Some(self.alloc(NodeKind::ObjectProperty { key, value, kind, computed: *computed }))
            }
            p::ObjectProperty::SpreadElement { .. } => None,
        }
    }

    fn lower_pattern(&mut self, pattern: &p::Pattern) -> NodeId {
        match pattern {
            p::Pattern::Identifier(id) => self.lower_identifier(id),
            p::Pattern::ArrayPattern { elements } => {
                let elements = elements
                    .iter()
                    .map(|e| e.as_ref().map(|e| self.lower_pattern(e)))
                    .collect();
                self.alloc(NodeKind::ArrayPattern { elements })
            }
            p::Pattern::ObjectPattern { properties } => {
                let properties = properties.iter().map(|prop| self.lower_pattern_property(prop)).collect();
                self.alloc(NodeKind::ObjectPattern { properties })
            }
            p::Pattern::AssignmentPattern { left, right } => {
                let left = self.lower_pattern(left);
                let right = self.lower_expression(right);
                self.alloc(NodeKind::AssignmentPattern { left, right })
            }
            p::Pattern::RestElement { argument } => {
                let argument = self.lower_pattern(argument);
                self.alloc(NodeKind::RestElement { argument })
            }
        }
    }

    fn lower_pattern_property(&mut self, prop: &p::ObjectPatternProperty) -> NodeId {
        match prop {
            p::ObjectPatternProperty::Property { key, value, computed, .. } => {
                let key = self.lower_property_key(key);
                let value = self.lower_pattern(value);
                self.alloc(NodeKind::ObjectPatternProperty { key, value, computed: *computed })
            }
            p::ObjectPatternProperty::RestElement { argument } => {
                let argument = self.lower_pattern(argument);
                self.alloc(NodeKind::RestElement { argument })
            }
        }
    }
}

/// Lower a single node attached to freestanding JSDoc-ish metadata. Used
/// by callers (e.g. test fixtures) that want to attach declared types or
/// `@suppress` tags without going through a full JSDoc parser.
pub fn attach_jsdoc(arena: &mut Arena, id: NodeId, jsdoc: JsDocInfo) {
    if let Ok(node) = arena.get_mut(id) {
        node.jsdoc = Some(jsdoc);
    }
}

fn lower_var_kind(kind: &p::VariableDeclarationKind) -> VarKind {
    match kind {
        p::VariableDeclarationKind::Var => VarKind::Var,
        p::VariableDeclarationKind::Let => VarKind::Let,
        p::VariableDeclarationKind::Const => VarKind::Const,
    }
}

fn lower_logical_operator(op: &p::BinaryOperator) -> Option<LogicalOperator> {
    match op {
        p::BinaryOperator::LogicalAnd => Some(LogicalOperator::And),
        p::BinaryOperator::LogicalOr => Some(LogicalOperator::Or),
        _ => None,
    }
}

fn lower_binary_operator(op: &p::BinaryOperator) -> BinaryOperator {
    match op {
        p::BinaryOperator::Add => BinaryOperator::Add,
        p::BinaryOperator::Subtract => BinaryOperator::Sub,
        p::BinaryOperator::Multiply => BinaryOperator::Mul,
        p::BinaryOperator::Divide => BinaryOperator::Div,
        p::BinaryOperator::Remainder => BinaryOperator::Mod,
        p::BinaryOperator::Exponentiation => BinaryOperator::Exponent,
        p::BinaryOperator::Equal => BinaryOperator::Equal,
        p::BinaryOperator::NotEqual => BinaryOperator::NotEqual,
        p::BinaryOperator::StrictEqual => BinaryOperator::StrictEqual,
        p::BinaryOperator::StrictNotEqual => BinaryOperator::StrictNotEqual,
        p::BinaryOperator::LessThan => BinaryOperator::Less,
        p::BinaryOperator::LessThanEqual => BinaryOperator::LessEqual,
        p::BinaryOperator::GreaterThan => BinaryOperator::Greater,
        p::BinaryOperator::GreaterThanEqual => BinaryOperator::GreaterEqual,
        p::BinaryOperator::LeftShift => BinaryOperator::ShiftLeft,
        p::BinaryOperator::RightShift => BinaryOperator::ShiftRight,
        p::BinaryOperator::UnsignedRightShift => BinaryOperator::UnsignedShiftRight,
        p::BinaryOperator::BitwiseAnd => BinaryOperator::BitAnd,
        p::BinaryOperator::BitwiseOr => BinaryOperator::BitOr,
        p::BinaryOperator::BitwiseXor => BinaryOperator::BitXor,
        p::BinaryOperator::In => BinaryOperator::In,
        p::BinaryOperator::Instanceof => BinaryOperator::InstanceOf,
        p::BinaryOperator::LogicalAnd | p::BinaryOperator::LogicalOr => {
            unreachable!("logical operators are routed to LogicalExpression")
        }
    }
}

fn lower_unary_operator(op: &p::UnaryOperator) -> UnaryOperator {
    match op {
        p::UnaryOperator::Plus => UnaryOperator::Plus,
        p::UnaryOperator::Minus => UnaryOperator::Minus,
        p::UnaryOperator::LogicalNot => UnaryOperator::Not,
        p::UnaryOperator::BitwiseNot => UnaryOperator::BitNot,
        p::UnaryOperator::Typeof => UnaryOperator::TypeOf,
        p::UnaryOperator::Void => UnaryOperator::Void,
        p::UnaryOperator::Delete => UnaryOperator::Delete,
    }
}

fn lower_assignment_operator(op: &p::AssignmentOperator) -> AssignmentOperator {
    match op {
        p::AssignmentOperator::Assign => AssignmentOperator::Assign,
        p::AssignmentOperator::AddAssign => AssignmentOperator::AddAssign,
        p::AssignmentOperator::SubtractAssign => AssignmentOperator::SubAssign,
        p::AssignmentOperator::MultiplyAssign => AssignmentOperator::MulAssign,
        p::AssignmentOperator::DivideAssign => AssignmentOperator::DivAssign,
        p::AssignmentOperator::RemainderAssign => AssignmentOperator::ModAssign,
        p::AssignmentOperator::ExponentiationAssign => AssignmentOperator::ExponentAssign,
        p::AssignmentOperator::LeftShiftAssign => AssignmentOperator::ShiftLeftAssign,
        p::AssignmentOperator::RightShiftAssign => AssignmentOperator::ShiftRightAssign,
        p::AssignmentOperator::UnsignedRightShiftAssign => AssignmentOperator::UnsignedShiftRightAssign,
        p::AssignmentOperator::BitwiseAndAssign => AssignmentOperator::BitAndAssign,
        p::AssignmentOperator::BitwiseOrAssign => AssignmentOperator::BitOrAssign,
        p::AssignmentOperator::BitwiseXorAssign => AssignmentOperator::BitXorAssign,
        p::AssignmentOperator::LogicalAndAssign => AssignmentOperator::LogicalAndAssign,
        p::AssignmentOperator::LogicalOrAssign => AssignmentOperator::LogicalOrAssign,
        p::AssignmentOperator::NullishCoalescingAssign => AssignmentOperator::NullishCoalescingAssign,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast_types::{
        Expression, Identifier, Literal, NumberLiteral, Pattern, Program, ProgramSourceType,
        Statement, VariableDeclarationKind, VariableDeclarator,
    };

    #[test]
    fn lowers_a_simple_var_decl_and_return() {
        let program = Program {
            source_type: ProgramSourceType::Script,
            body: vec![Statement::FunctionDeclaration {
                id: Some(Identifier { name: "f".into() }),
                params: vec![],
                body: crate::parser::ast_types::BlockStatement {
                    body: vec![
                        Statement::VariableDeclaration {
                            kind: VariableDeclarationKind::Var,
                            declarations: vec![VariableDeclarator {
                                id: Pattern::Identifier(Identifier { name: "x".into() }),
                                init: Some(Expression::Literal(Literal::Number(NumberLiteral { value: 1.0 }))),
                            }],
                        },
                        Statement::ReturnStatement {
                            argument: Some(Expression::Identifier(Identifier { name: "x".into() })),
                        },
                    ],
                },
                is_async: false,
                is_generator: false,
            }],
        };

        let (arena, root) = Builder::new(SourceId(0)).build(&program);
        assert_eq!(arena.children(root).unwrap().len(), 1);
        let func = arena.children(root).unwrap()[0];
        match &arena.get(func).unwrap().kind {
            NodeKind::FunctionDeclaration { body, .. } => {
                assert_eq!(arena.children(*body).unwrap().len(), 2);
            }
            other => panic!("expected FunctionDeclaration, got {other:?}"),
        }
    }
}
