use crate::models::{DatabaseInstance, EngineKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineFilter {
    #[default]
    All,
    Only(EngineKind),
}

impl EngineFilter {
    pub fn matches(&self, engine: EngineKind) -> bool {
        match self {
            EngineFilter::All => true,
            EngineFilter::Only(kind) => *kind == engine,
        }
    }

    /// all → mysql → postgresql → all
    pub fn cycle(&self) -> EngineFilter {
        match self {
            EngineFilter::All => EngineFilter::Only(EngineKind::Mysql),
            EngineFilter::Only(EngineKind::Mysql) => EngineFilter::Only(EngineKind::Postgresql),
            EngineFilter::Only(EngineKind::Postgresql) => EngineFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EngineFilter::All => "all",
            EngineFilter::Only(kind) => kind.as_str(),
        }
    }
}

/// Why a filtered view is empty. The two cases get different messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    NoInstances,
    NoMatches,
}

impl EmptyState {
    pub fn message(&self) -> &'static str {
        match self {
            EmptyState::NoInstances => "No databases yet. Press 'n' to create your first database.",
            EmptyState::NoMatches => "No databases found matching your search.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    pub instances: Vec<DatabaseInstance>,
    pub empty: Option<EmptyState>,
}

/// Case-insensitive name search combined with an engine filter. Pure.
pub fn filter_instances(instances: &[DatabaseInstance], search_term: &str, engine: EngineFilter) -> FilteredView {
    let needle = search_term.to_lowercase();
    let matched: Vec<DatabaseInstance> = instances
        .iter()
        .filter(|db| db.name.to_lowercase().contains(&needle) && engine.matches(db.engine))
        .cloned()
        .collect();

    let empty = match (instances.is_empty(), matched.is_empty()) {
        (true, _) => Some(EmptyState::NoInstances),
        (false, true) => Some(EmptyState::NoMatches),
        (false, false) => None,
    };
    FilteredView { instances: matched, empty }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::instance::sample;

    fn fixture() -> Vec<DatabaseInstance> {
        vec![
            sample(1, "shop", EngineKind::Mysql, 0.0),
            sample(2, "blog", EngineKind::Postgresql, 0.0),
            sample(3, "MySQL_legacy", EngineKind::Mysql, 0.0),
        ]
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let all = fixture();
        let upper = filter_instances(&all, "MySQL", EngineFilter::All);
        let lower = filter_instances(&all, "mysql", EngineFilter::All);
        assert_eq!(upper, lower);
        assert_eq!(upper.instances.len(), 1);
        assert_eq!(upper.instances[0].id, 3);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let all = fixture();
        let once = filter_instances(&all, "o", EngineFilter::Only(EngineKind::Mysql));
        let twice = filter_instances(&once.instances, "o", EngineFilter::Only(EngineKind::Mysql));
        assert_eq!(once.instances, twice.instances);
        assert_eq!(once.instances.iter().map(|d| d.id).collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn test_engine_filter() {
        let view = filter_instances(&fixture(), "", EngineFilter::Only(EngineKind::Postgresql));
        assert_eq!(view.instances.len(), 1);
        assert_eq!(view.empty, None);
    }

    #[test]
    fn test_empty_states_are_distinct() {
        let none = filter_instances(&[], "anything", EngineFilter::All);
        assert_eq!(none.empty, Some(EmptyState::NoInstances));

        let no_match = filter_instances(&fixture(), "zzz", EngineFilter::All);
        assert_eq!(no_match.empty, Some(EmptyState::NoMatches));
        assert_ne!(EmptyState::NoInstances.message(), EmptyState::NoMatches.message());
    }

    #[test]
    fn test_cycle_wraps() {
        let f = EngineFilter::All.cycle().cycle().cycle();
        assert_eq!(f, EngineFilter::All);
    }
}
