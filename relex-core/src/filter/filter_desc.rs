use crate::component::ComponentId;
use std::fmt::Display;
use std::fmt::Formatter;
use to_vec::ToVec;

/// Canonical form of a term list: sorted, deduplicated component ids per
/// clause. Term order and repetition do not change the signature, so every
/// spelling of the same query resolves to one cached query.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct QuerySignature {
    pub(crate) all: Vec<ComponentId>,
    pub(crate) none: Vec<ComponentId>,
    pub(crate) any: Vec<Vec<ComponentId>>,
}

impl QuerySignature {
    pub(crate) fn new(
        mut all: Vec<ComponentId>,
        mut none: Vec<ComponentId>,
        any: Vec<Vec<ComponentId>>,
    ) -> QuerySignature {
        canonicalize(&mut all);
        canonicalize(&mut none);
        let mut any = any
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|mut group| {
                canonicalize(&mut group);
                group
            })
            .to_vec();
        any.sort();
        any.dedup();
        QuerySignature { all, none, any }
    }

    /// Every component mentioned by any clause, without repetition.
    pub(crate) fn components(&self) -> Vec<ComponentId> {
        let mut components = self
            .all
            .iter()
            .chain(self.none.iter())
            .chain(self.any.iter().flatten())
            .copied()
            .to_vec();
        canonicalize(&mut components);
        components
    }

    /// An entity without components satisfies the query.
    pub(crate) fn matches_empty_entity(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }
}

fn canonicalize(ids: &mut Vec<ComponentId>) {
    ids.sort();
    ids.dedup();
}

impl Display for QuerySignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut clauses = self.all.iter().map(|it| it.to_string()).to_vec();
        clauses.extend(self.none.iter().map(|it| format!("!{}", it)));
        clauses.extend(self.any.iter().map(|group| {
            format!(
                "({})",
                group.iter().map(|it| it.to_string()).to_vec().join("|")
            )
        }));
        write!(f, "query!( {} )", clauses.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use crate::component::ComponentId;
    use crate::filter::filter_desc::QuerySignature;

    #[test]
    fn order_and_duplicates_ignored() {
        let a = QuerySignature::new(
            vec![ComponentId(3), ComponentId(1), ComponentId(3)],
            vec![ComponentId(7)],
            vec![vec![ComponentId(5), ComponentId(4)]],
        );
        let b = QuerySignature::new(
            vec![ComponentId(1), ComponentId(3)],
            vec![ComponentId(7), ComponentId(7)],
            vec![vec![ComponentId(4), ComponentId(5)], vec![]],
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "query!( c1, c3, !c7, (c4|c5) )");
    }
}
