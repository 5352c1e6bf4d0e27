use rp_source::Expression;

/// Marker text for expressions the diagram cannot describe.
pub const UNSUPPORTED_EXPRESSION: &str = "???";

/// Render an expression as the short text shown in conditions and call
/// parameters. Never fails: unknown shapes become [`UNSUPPORTED_EXPRESSION`].
#[must_use]
pub fn expression_text(expression: &Expression) -> String {
    match expression {
        Expression::IntLiteral { value }
        | Expression::DecLiteral { value }
        | Expression::StringLiteral { value } => value.clone(),
        Expression::FigurativeConstant { text } => text.to_uppercase(),
        Expression::Reference { name } => name.to_uppercase(),
        Expression::Comparison {
            comparison,
            left,
            right,
        } => format!(
            "{} {} {}",
            expression_text(left),
            comparison.operator(),
            expression_text(right)
        ),
        Expression::LogicalNegation { base } => format!("NOT {}", expression_text(base)),
        Expression::BuiltinFunctionCall {
            function_name,
            params,
        } => {
            let args: Vec<String> = params.iter().map(expression_text).collect();
            format!("{}({})", function_name.to_uppercase(), args.join(","))
        }
        Expression::Unsupported => UNSUPPORTED_EXPRESSION.to_string(),
    }
}
