//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::symbolic::symbolic_engine::{EvaluationError, Expr};
    use approx::assert_relative_eq;

    fn x() -> Expr {
        Expr::Var("x".to_string())
    }

    #[test]
    fn test_neg() {
        let neg_expr = -x();
        let expected = Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(x()));
        assert_eq!(neg_expr, expected);
    }

    #[test]
    fn test_combined_operations() {
        let expr = (x() + Expr::Const(2.0)) * Expr::Const(3.0) - Expr::Const(1.0);
        let expr = expr / Expr::Const(2.0);
        let expected = Expr::Div(
            Box::new(Expr::Sub(
                Box::new(Expr::Mul(
                    Box::new(Expr::Add(Box::new(x()), Box::new(Expr::Const(2.0)))),
                    Box::new(Expr::Const(3.0)),
                )),
                Box::new(Expr::Const(1.0)),
            )),
            Box::new(Expr::Const(2.0)),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_display_uses_minimal_parentheses() {
        assert_eq!((x().pow(Expr::Const(2.0)) - Expr::Const(4.0)).to_string(), "x^2 - 4");
        assert_eq!((x() - Expr::Const(1.0)).ln().to_string(), "ln(x - 1)");
        assert_eq!(x().sqrt().to_string(), "sqrt(x)");
        assert_eq!(
            (Expr::Const(1.0) / (x() + Expr::Const(1.0))).to_string(),
            "1/(x + 1)"
        );
        assert_eq!((x() * (x() - Expr::Const(2.0))).to_string(), "x*(x - 2)");
        assert_eq!((-x()).to_string(), "-x");
        assert_eq!((x() + Expr::Const(-3.0)).to_string(), "x - 3");
        assert_eq!(
            (x() - (x() - Expr::Const(1.0))).to_string(),
            "x - (x - 1)"
        );
        assert_eq!(
            (x() + Expr::Const(1.0)).pow(Expr::Const(3.0)).to_string(),
            "(x + 1)^3"
        );
    }

    #[test]
    fn test_srepr_is_structural() {
        let expr = x() + Expr::Const(1.0);
        assert_eq!(expr.srepr(), "Add(Var(\"x\"), Const(1.0))");
    }

    #[test]
    fn test_set_variable() {
        let expr = x() + x().pow(Expr::Const(2.0));
        let result = expr.set_variable("x", 3.0);
        assert_eq!(
            result,
            Expr::Const(3.0) + Expr::Const(3.0).pow(Expr::Const(2.0))
        );
        assert_eq!(result.simplify_(), Expr::Const(12.0));
    }

    #[test]
    fn test_substitute2() {
        let expr = x() + x().pow(Expr::Const(2.0));
        let result = expr.substitute_variable("x", &Expr::Var("y".to_string()));
        let y = Expr::Var("y".to_string());
        let expected = y.clone() + y.clone().pow(Expr::Const(2.0));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_variables() {
        let expr = (x() + Expr::Var("a".to_string())) * x().exp();
        assert!(expr.contains_variable("x"));
        assert!(!expr.contains_variable("b"));
        assert_eq!(expr.all_arguments_are_variables(), vec!["a", "x"]);
        assert!(Expr::Const(2.0).ln().is_constant());
    }

    #[test]
    fn test_walk_is_pre_order() {
        let expr = Expr::sin(Box::new(x() + Expr::Const(1.0)));
        let mut names = Vec::new();
        expr.walk(&mut |node| names.push(format!("{:?}", node).chars().take(3).collect::<String>()));
        assert_eq!(names, vec!["sin", "Add", "Var", "Con"]);
    }

    #[test]
    fn test_eval_checked_arithmetic() {
        let expr = x() * x() + Expr::Const(2.0) * x() - Expr::Const(1.0);
        assert_eq!(expr.eval_checked("x", 3.0), Ok(14.0));
        let expr = x().exp();
        assert_relative_eq!(expr.eval_checked("x", 1.0).unwrap(), std::f64::consts::E);
        let expr = Expr::arcctg(Box::new(x()));
        assert_relative_eq!(
            expr.eval_checked("x", 1.0).unwrap(),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_eval_checked_failures() {
        assert_eq!(
            (Expr::Const(1.0) / x()).eval_checked("x", 0.0),
            Err(EvaluationError::DivisionByZero)
        );
        assert_eq!(
            x().ln().eval_checked("x", -1.0),
            Err(EvaluationError::LogOfNonPositive(-1.0))
        );
        assert_eq!(
            x().sqrt().eval_checked("x", -4.0),
            Err(EvaluationError::EvenRootOfNegative(-4.0))
        );
        assert!(matches!(
            Expr::arcsin(Box::new(x())).eval_checked("x", 2.0),
            Err(EvaluationError::OutOfDomain { function: "arcsin", .. })
        ));
        assert_eq!(
            x().pow(Expr::Const(-1.0)).eval_checked("x", 0.0),
            Err(EvaluationError::DivisionByZero)
        );
        assert_eq!(
            x().eval_checked("y", 1.0),
            Err(EvaluationError::UnboundVariable("x".to_string()))
        );
        assert_eq!(
            x().exp().eval_checked("x", 1000.0),
            Err(EvaluationError::NonFinite)
        );
    }

    #[test]
    fn test_odd_roots_of_negative_numbers_are_real() {
        let cube_root = x().pow(Expr::Const(1.0 / 3.0));
        assert_relative_eq!(cube_root.eval_checked("x", -8.0).unwrap(), -2.0, epsilon = 1e-12);
        let two_thirds = x().pow(Expr::Const(2.0 / 3.0));
        assert_relative_eq!(two_thirds.eval_checked("x", -8.0).unwrap(), 4.0, epsilon = 1e-12);
        let integer_power = x().pow(Expr::Const(3.0));
        assert_eq!(integer_power.eval_checked("x", -2.0), Ok(-8.0));
    }

    #[test]
    fn test_const_value() {
        assert_eq!((Expr::Const(2.0) * Expr::Const(3.0)).const_value(), Some(6.0));
        assert_eq!((Expr::Const(1.0) / Expr::Const(0.0)).const_value(), None);
        assert_eq!(x().const_value(), None);
    }
}
