//! Compiles the plan algebra into operator trees.

use std::collections::HashMap;

use tracing::debug;
use xqrt_core::{ErrorCode, Item, Sequence, SequenceType};

use super::expr::{Clause, Expr, FunctionDecl, Module, TypeswitchCase, TypeswitchDefault};
use super::CompiledPlan;
use crate::error::{RuntimeError, RuntimeResult};
use crate::function::{function_key, FunctionRegistry};
use crate::operators::{
    ArithmeticOp, CallOp, CaseClause, CompareOp, ConcatOp, CountOp, DefaultClause, FlworOp,
    ForOp, GlobalVarOp, IfOp, Iter, LetOp, LiteralOp, LocalVarOp, LogicOp, NegateOp, PathOp,
    RangeOp, TupleIter, TypeswitchOp, UnitOp, UserCallOp, UserFunction, WhereOp,
};
use crate::register::{GlobalRegister, GlobalRegisterAllocator, LocalRegister, RegisterAllocator};

/// Namespace prefix assumed for unprefixed function names.
const DEFAULT_FUNCTION_PREFIX: &str = "fn";

/// Turns a [`Module`] into a [`CompiledPlan`].
///
/// The compiler is the only writer of the register allocators: every
/// variable, iterator state cell and buffer gets its slot here, so frames
/// sized by the resulting plan never grow.
pub struct PlanCompiler<'r> {
    registry: &'r FunctionRegistry,
    alloc: RegisterAllocator,
    externals: GlobalRegisterAllocator,
    external_types: Vec<Option<SequenceType>>,
    /// `name#arity` to index in the function table.
    user_functions: HashMap<String, usize>,
    /// Variables in scope, innermost last.
    scope: Vec<(String, LocalRegister<Sequence>)>,
}

impl<'r> PlanCompiler<'r> {
    /// Creates a compiler resolving library calls against `registry`.
    #[must_use]
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self {
            registry,
            alloc: RegisterAllocator::new(),
            externals: GlobalRegisterAllocator::new(),
            external_types: Vec::new(),
            user_functions: HashMap::new(),
            scope: Vec::new(),
        }
    }

    /// Compiles a module.
    ///
    /// # Errors
    ///
    /// Returns a static error for unbound variables (`XPST0008`), unknown
    /// functions (`XPST0017`) and duplicate function declarations
    /// (`XQST0034`).
    pub fn compile(mut self, module: &Module) -> RuntimeResult<CompiledPlan> {
        for decl in &module.externals {
            if self.externals.lookup(&decl.name).is_none() {
                self.externals.allocate(decl.name.clone());
                self.external_types.push(decl.sequence_type.clone());
            }
        }

        // Indices first, so bodies can call any declared function.
        for (index, decl) in module.functions.iter().enumerate() {
            let key = function_key(&decl.name, decl.params.len());
            if self.user_functions.insert(key.clone(), index).is_some() {
                return Err(RuntimeError::static_error(
                    ErrorCode::XQST0034,
                    format!("function {key} is declared more than once"),
                ));
            }
        }
        let functions = module
            .functions
            .iter()
            .map(|decl| self.function(decl))
            .collect::<RuntimeResult<Vec<_>>>()?;

        let root = self.expr(&module.body)?;
        let frame_size = self.alloc.frame_size();
        debug!(
            frame_size,
            globals = self.externals.len(),
            functions = functions.len(),
            "compiled plan"
        );

        Ok(CompiledPlan {
            root,
            frame_size,
            externals: self.externals,
            external_types: self.external_types,
            functions,
        })
    }

    fn function(&mut self, decl: &FunctionDecl) -> RuntimeResult<UserFunction> {
        let outer = std::mem::take(&mut self.scope);
        let mark = self.alloc.mark();

        let params: Vec<_> = decl.params.iter().map(|p| self.bind(&p.name)).collect();
        let body = self.expr(&decl.body);
        self.scope = outer;
        let body = body?;

        let window = self.alloc.range_since(mark);
        debug!(
            function = %decl.name,
            window_start = window.start(),
            window_len = window.len(),
            "compiled function"
        );
        Ok(UserFunction::new(
            decl.name.clone(),
            params,
            decl.params.iter().map(|p| p.sequence_type.clone()).collect(),
            decl.return_type.clone(),
            body,
            window,
        ))
    }

    /// Allocates a register for `name` and brings it into scope.
    fn bind(&mut self, name: &str) -> LocalRegister<Sequence> {
        let register = LocalRegister::new(self.alloc.allocate_one());
        self.scope.push((name.to_owned(), register));
        register
    }

    fn lookup(&self, name: &str) -> Option<LocalRegister<Sequence>> {
        self.scope.iter().rev().find(|(n, _)| n == name).map(|(_, r)| *r)
    }

    fn expr(&mut self, expr: &Expr) -> RuntimeResult<Iter> {
        let iter = match expr {
            Expr::Literal(values) => {
                let value = values.iter().cloned().map(Item::Atomic).collect();
                LiteralOp::new(&mut self.alloc, value).into()
            }
            Expr::Var(name) => self.var(name)?,
            Expr::Sequence(items) => {
                let children = self.exprs(items)?;
                ConcatOp::new(&mut self.alloc, children).into()
            }
            Expr::Range { low, high } => {
                let low = self.expr(low)?;
                let high = self.expr(high)?;
                RangeOp::new(&mut self.alloc, low, high).into()
            }
            Expr::Arithmetic { op, lhs, rhs } => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                ArithmeticOp::new(&mut self.alloc, *op, lhs, rhs).into()
            }
            Expr::Negate(operand) => {
                let operand = self.expr(operand)?;
                NegateOp::new(&mut self.alloc, operand).into()
            }
            Expr::Compare { kind, op, lhs, rhs } => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                CompareOp::new(&mut self.alloc, *kind, *op, lhs, rhs).into()
            }
            Expr::Logic { op, lhs, rhs } => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                LogicOp::new(&mut self.alloc, *op, lhs, rhs).into()
            }
            Expr::If { condition, then_branch, else_branch } => {
                let condition = self.expr(condition)?;
                let then_branch = self.expr(then_branch)?;
                let else_branch = self.expr(else_branch)?;
                IfOp::new(&mut self.alloc, condition, then_branch, else_branch).into()
            }
            Expr::Typeswitch { operand, cases, default } => {
                self.typeswitch(operand, cases, default)?
            }
            Expr::Flwor { clauses, ret } => {
                let depth = self.scope.len();
                let result = self.flwor(clauses, ret);
                self.scope.truncate(depth);
                result?
            }
            Expr::Path { context, axis, test } => {
                let context = self.expr(context)?;
                PathOp::new(&mut self.alloc, context, *axis, test.clone()).into()
            }
            Expr::Call { name, args } => self.call(name, args)?,
        };
        Ok(iter)
    }

    fn exprs(&mut self, exprs: &[Expr]) -> RuntimeResult<Vec<Iter>> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn var(&mut self, name: &str) -> RuntimeResult<Iter> {
        if let Some(register) = self.lookup(name) {
            return Ok(LocalVarOp::new(&mut self.alloc, name, register).into());
        }
        if let Some(index) = self.externals.lookup(name) {
            return Ok(GlobalVarOp::new(&mut self.alloc, name, GlobalRegister::new(index)).into());
        }
        Err(RuntimeError::static_error(
            ErrorCode::XPST0008,
            format!("variable ${name} is not in scope"),
        ))
    }

    fn typeswitch(
        &mut self,
        operand: &Expr,
        cases: &[TypeswitchCase],
        default: &TypeswitchDefault,
    ) -> RuntimeResult<Iter> {
        let operand = self.expr(operand)?;
        let mut compiled = Vec::with_capacity(cases.len());
        for case in cases {
            let (variable, body) = self.scoped(case.var.as_deref(), &case.body)?;
            compiled.push(CaseClause::new(case.sequence_type.clone(), variable, body));
        }
        let (variable, body) = self.scoped(default.var.as_deref(), &default.body)?;
        let default = DefaultClause::new(variable, body);
        Ok(TypeswitchOp::new(&mut self.alloc, operand, compiled, default).into())
    }

    /// Compiles `body` with an optional variable in scope.
    fn scoped(
        &mut self,
        var: Option<&str>,
        body: &Expr,
    ) -> RuntimeResult<(Option<LocalRegister<Sequence>>, Iter)> {
        let depth = self.scope.len();
        let variable = var.map(|name| self.bind(name));
        let body = self.expr(body);
        self.scope.truncate(depth);
        Ok((variable, body?))
    }

    /// Compiles a clause chain and its return expression. Clause variables
    /// are left in scope; the caller truncates.
    fn flwor(&mut self, clauses: &[Clause], ret: &Expr) -> RuntimeResult<Iter> {
        let mut chain: TupleIter = UnitOp::new(&mut self.alloc).into();
        for clause in clauses {
            chain = match clause {
                Clause::For { var, position, expr } => {
                    let binding = self.expr(expr)?;
                    let variable = self.bind(var);
                    let position = position.as_deref().map(|p| self.bind(p));
                    ForOp::new(&mut self.alloc, chain, binding, variable, position).into()
                }
                Clause::Let { var, expr } => {
                    let binding = self.expr(expr)?;
                    let variable = self.bind(var);
                    LetOp::new(&mut self.alloc, chain, binding, variable).into()
                }
                Clause::Where(condition) => {
                    let condition = self.expr(condition)?;
                    WhereOp::new(&mut self.alloc, chain, condition).into()
                }
                Clause::Count { var } => {
                    let variable = self.bind(var);
                    CountOp::new(&mut self.alloc, chain, variable).into()
                }
            };
        }
        let ret = self.expr(ret)?;
        Ok(FlworOp::new(&mut self.alloc, chain, ret).into())
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> RuntimeResult<Iter> {
        let key = function_key(name, args.len());
        if let Some(&index) = self.user_functions.get(&key) {
            let args = self.exprs(args)?;
            return Ok(UserCallOp::new(&mut self.alloc, index, args).into());
        }

        let qualified = if name.contains(':') {
            name.to_owned()
        } else {
            format!("{DEFAULT_FUNCTION_PREFIX}:{name}")
        };
        let Some(function) = self.registry.get(&qualified, args.len()) else {
            return Err(RuntimeError::static_error(
                ErrorCode::XPST0017,
                format!("unknown function {}", function_key(&qualified, args.len())),
            ));
        };
        let args = self.exprs(args)?;
        Ok(CallOp::new(&mut self.alloc, function, args).into())
    }
}

/// Compiles `module` against `registry`.
///
/// # Errors
///
/// See [`PlanCompiler::compile`].
pub fn compile(module: &Module, registry: &FunctionRegistry) -> RuntimeResult<CompiledPlan> {
    PlanCompiler::new(registry).compile(module)
}
