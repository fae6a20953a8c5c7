use crate::{
    algebra::ops::{Builtins, Context},
    arithmetic, convert,
    graph::{self, GraphOptions, Plot},
    scientific, solve_equation_with, ArithmeticOp, CalcError,
    ConversionCategory, History, OperationResult, ScientificOp, SolverOptions,
};

/// One user's calculator session.
///
/// Each calculation goes through the pure dispatchers and the outcome is
/// recorded in the session's [`History`]. Unit conversions and graphs are
/// not recorded.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session<C = Builtins> {
    history: History,
    solver_options: SolverOptions,
    graph_options: GraphOptions,
    ctx: C,
}

impl Session<Builtins> {
    pub fn new() -> Self { Session::default() }
}

impl<C: Context> Session<C> {
    /// Create a session which evaluates functions using a custom
    /// [`Context`].
    pub fn with_context(ctx: C) -> Self {
        Session {
            history: History::new(),
            solver_options: SolverOptions::default(),
            graph_options: GraphOptions::default(),
            ctx,
        }
    }

    pub fn with_solver_options(self, solver_options: SolverOptions) -> Self {
        Session {
            solver_options,
            ..self
        }
    }

    pub fn with_graph_options(self, graph_options: GraphOptions) -> Self {
        Session {
            graph_options,
            ..self
        }
    }

    pub fn history(&self) -> &History { &self.history }

    pub fn reset_history(&mut self) { self.history.reset_all(); }

    pub fn graph_options(&self) -> &GraphOptions { &self.graph_options }

    pub fn arithmetic(
        &mut self,
        op: ArithmeticOp,
        a: f64,
        b: f64,
    ) -> OperationResult {
        let result = OperationResult::from(arithmetic(op, a, b));
        self.history.append(format!("{} {} {} = {}", a, op, b, result));

        result
    }

    pub fn scientific(
        &mut self,
        op: ScientificOp,
        args: &[f64],
    ) -> OperationResult {
        let result = OperationResult::from(scientific(op, args));

        let args: Vec<_> = args.iter().map(ToString::to_string).collect();
        self.history
            .append(format!("{}({}) = {}", op, args.join(", "), result));

        result
    }

    /// Convert between units. This is never recorded in the history.
    pub fn convert(
        &self,
        category: ConversionCategory,
        from: &str,
        to: &str,
        value: f64,
    ) -> f64 {
        convert(category, from, to, value)
    }

    /// Solve an equation for `x`, recording it in the history if it worked.
    pub fn solve_equation(&mut self, equation: &str) -> OperationResult {
        let equation = equation.trim();

        match solve_equation_with(equation, &self.ctx, &self.solver_options) {
            Ok(solution) => {
                let result = OperationResult::SymbolicSet(solution.roots);
                self.history.append(format!(
                    "Solved equation {} with solutions {}",
                    equation, result
                ));
                result
            },
            Err(e) => OperationResult::Error(CalcError::from(e)),
        }
    }

    /// Sample `expression` over the session's [`GraphOptions`].
    pub fn graph(&self, expression: &str) -> Result<Plot, CalcError> {
        graph::sample_with(expression, &self.ctx, &self.graph_options)
            .map_err(CalcError::from)
    }
}
