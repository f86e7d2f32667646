use crate::error::SyntaxError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const OPENING: [char; 3] = ['[', '(', '{'];
const CLOSING: [char; 3] = [']', ')', '}'];

/// Split a specification into its fragments.
///
/// Words are separated by whitespace, except that words are merged into a single fragment while a bracket (`[]`, `()`, `{}`) or quote group is left open.
/// Each fragment is a slice of `specification`, so any whitespace inside a merged fragment is preserved as written.
///
/// A trailing fragment that never closes its group is dropped.
///
/// ### Example
/// ```
/// # use paperbush_compiler::split_args;
/// assert_eq!(
///     split_args("square:int --verbosity:int:[0, 1, 2]").unwrap(),
///     vec!["square:int", "--verbosity:int:[0, 1, 2]"]
/// );
/// ```
pub fn split_args(specification: &str) -> Result<Vec<&str>, SyntaxError> {
    let mut fragments = Vec::default();
    // Byte offset of the first word in the open fragment.
    let mut open: Option<usize> = None;

    for (start, word) in words(specification) {
        let end = start + word.len();

        match open {
            Some(fragment_start) => {
                let fragment = &specification[fragment_start..end];

                if is_balanced(fragment)? {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Merged fragment '{fragment}'.");
                    }

                    fragments.push(fragment);
                    open = None;
                }
            }
            None => {
                if is_balanced(word)? {
                    fragments.push(word);
                } else {
                    open = Some(start);
                }
            }
        }
    }

    #[cfg(feature = "tracing_debug")]
    {
        if let Some(fragment_start) = open {
            debug!(
                "Dropping unbalanced trailing fragment '{}'.",
                specification[fragment_start..].trim_end()
            );
        }
    }

    Ok(fragments)
}

/// Whitespace separated words, alongside their byte offset.
fn words(specification: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let mut cursor = 0;

    std::iter::from_fn(move || {
        let start = cursor + specification[cursor..].find(|c: char| !c.is_whitespace())?;
        let end = specification[start..]
            .find(char::is_whitespace)
            .map_or(specification.len(), |length| start + length);
        cursor = end;
        Some((start, &specification[start..end]))
    })
}

/// Whether every bracket and quote group in `fragment` is closed.
///
/// Brackets inside a quoted span are plain text, as is any other quote character while one is open.
pub(crate) fn is_balanced(fragment: &str) -> Result<bool, SyntaxError> {
    let mut stack: Vec<char> = Vec::default();
    let mut quote: Option<char> = None;

    for c in fragment.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if OPENING.contains(&c) {
                    stack.push(c);
                } else if let Some(index) = CLOSING.iter().position(|&close| close == c) {
                    match stack.pop() {
                        Some(open) if open == OPENING[index] => {}
                        Some(open) => {
                            return Err(SyntaxError::MismatchedBrackets {
                                open,
                                close: c,
                                fragment: fragment.to_string(),
                            });
                        }
                        None => {
                            return Err(SyntaxError::UnopenedBracket {
                                close: c,
                                fragment: fragment.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    Ok(stack.is_empty() && quote.is_none())
}
