use crate::{
    algorithms::Strategy,
    config::SegmentationConfig,
    pipeline::MaskSelector,
    scoring::MaskScorer,
    traits::MaskGenerator,
};

/// Builder for mask selectors with a fluent API
pub struct MaskSelectorBuilder {
    config: SegmentationConfig,
    strategies: Option<Vec<Strategy>>,
    generators: Vec<Box<dyn MaskGenerator>>,
    scorer: Option<MaskScorer>,
}

impl MaskSelectorBuilder {
    /// Create a new selector builder
    pub fn new() -> Self {
        Self {
            config: SegmentationConfig::default(),
            strategies: None,
            generators: Vec::new(),
            scorer: None,
        }
    }

    /// Configuration used for the built-in strategies and the scorer
    pub fn with_config(mut self, config: SegmentationConfig) -> Self {
        self.config = config;
        self
    }

    /// Restrict the built-in strategies (kept in the given order)
    pub fn with_strategies<I>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = Strategy>,
    {
        self.strategies = Some(strategies.into_iter().collect());
        self
    }

    /// Add a custom generator.
    ///
    /// Once any custom generator is added, built-in strategies are only used
    /// when requested through `with_strategies`; custom generators run after them.
    pub fn add_generator<G>(mut self, generator: G) -> Self
    where
        G: MaskGenerator + 'static,
    {
        self.generators.push(Box::new(generator));
        self
    }

    /// Replace the scorer derived from the configuration
    pub fn set_scorer(mut self, scorer: MaskScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Build the selector; without explicit generators all four strategies run
    pub fn build(self) -> MaskSelector {
        let strategies = match self.strategies {
            Some(strategies) => strategies,
            None if self.generators.is_empty() => Strategy::all(),
            None => Vec::new(),
        };

        let mut generators: Vec<Box<dyn MaskGenerator>> = strategies
            .iter()
            .map(|strategy| strategy.generator(&self.config))
            .collect();
        generators.extend(self.generators);

        let scorer = self
            .scorer
            .unwrap_or_else(|| MaskScorer::from_config(&self.config));

        MaskSelector::new(generators, scorer)
    }

    /// Build the default four-strategy selector for a configuration
    pub fn build_with_config(config: SegmentationConfig) -> MaskSelector {
        Self::new().with_config(config).build()
    }
}

impl Default for MaskSelectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
