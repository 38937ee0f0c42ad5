//! Formatting helpers for the `display(&grammar)` renderers.

use std::fmt;

/// A value rendered by a closure.
pub struct DisplayFn<F>(F);

impl<F> fmt::Display for DisplayFn<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

/// Render through `f`, usually a closure borrowing the grammar.
pub fn display_fn<F>(f: F) -> DisplayFn<F>
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    DisplayFn(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_through_closure() {
        let names = ["S", "A"];
        let rendered = display_fn(|f| {
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
            }
            Ok(())
        });
        assert_eq!(rendered.to_string(), "S | A");
    }
}
