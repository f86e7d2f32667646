use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::model::{Argument, Fragment};

/// A compiled specification: the ordered arguments and separators.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pattern: String,
    fragments: Vec<Fragment>,
}

impl Schema {
    pub(crate) fn new(pattern: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            pattern: pattern.into(),
            fragments,
        }
    }

    /// Compile a specification with the default options and no reference values.
    ///
    /// ### Example
    /// ```
    /// # use paperbush_compiler::Schema;
    /// let schema = Schema::compile("square:int --verbose ^ --quiet").unwrap();
    ///
    /// assert_eq!(schema.fragments().len(), 4);
    /// assert_eq!(schema.arguments().len(), 3);
    /// assert_eq!(schema.groups(), vec![vec![1, 2]]);
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, CompileError> {
        Compiler::default().compile(pattern)
    }

    /// The specification this was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Every compiled fragment, separators included, in specification order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    #[allow(missing_docs)]
    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }

    /// The arguments, in specification order.
    pub fn arguments(&self) -> Vec<&Argument> {
        self.fragments.iter().filter_map(Fragment::argument).collect()
    }

    /// The groups of arguments linked together by separators, as indices into [`Schema::arguments`].
    ///
    /// A separator links the arguments on either side of it, and consecutive links chain into a single group.
    /// For example, `a ^ b ^ c d ^ e` produces the groups `[0, 1, 2]` and `[3, 4]`.
    /// A separator missing an argument on either side links nothing.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::default();
        // Index of the next argument.
        let mut index = 0;

        for (position, fragment) in self.fragments.iter().enumerate() {
            if !fragment.is_separator() {
                index += 1;
                continue;
            }

            let left_present = position > 0 && !self.fragments[position - 1].is_separator();
            let right_present = self
                .fragments
                .get(position + 1)
                .map_or(false, |next| !next.is_separator());

            if !(left_present && right_present) {
                continue;
            }

            let (left, right) = (index - 1, index);

            match groups.last_mut() {
                Some(group) if group.last() == Some(&left) => group.push(right),
                _ => groups.push(vec![left, right]),
            }
        }

        groups
    }
}

impl<'s> IntoIterator for &'s Schema {
    type Item = &'s Fragment;
    type IntoIter = std::slice::Iter<'s, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}
