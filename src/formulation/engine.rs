use std::collections::BTreeMap;

use log::{debug, info};
use ndarray::{Array1, ArrayView1};

use crate::build::BuildError;
use crate::config::{EngineConfig, StatisticChoice, StrategyChoice};
use crate::core::{StatisticError, StatisticResult};
use crate::formulation::{RobustProblem, StatisticFunction};
use crate::sink::{SampleDataset, SampleSink};

/// Named statistic functions of one problem, all estimated with the same strategy.
///
/// The outer iteration counter advances each time `estimate` sees a design
/// different from the previous one, so every statistic asked at the same
/// design point shares an iteration number. Sequential sampling sizes its
/// sample from that number.
pub struct StatisticEngine {
    problem: RobustProblem,
    strategy: StrategyChoice,
    functions: BTreeMap<String, StatisticFunction>,
    sink: Option<Box<dyn SampleSink>>,
    iteration: usize,
    last_design: Option<Array1<f64>>,
}

impl StatisticEngine {
    pub fn new(problem: RobustProblem, strategy: StrategyChoice) -> Self {
        Self {
            problem,
            strategy,
            functions: BTreeMap::new(),
            sink: None,
            iteration: 0,
            last_design: None,
        }
    }

    /// Engine with every statistic of `config` registered.
    pub fn from_config(problem: RobustProblem, config: &EngineConfig) -> Result<Self, BuildError> {
        let mut engine = Self::new(problem, config.strategy.clone());
        for (name, statistic) in &config.statistics {
            engine.add_statistic(name.clone(), statistic.clone())?;
        }
        Ok(engine)
    }

    pub fn with_sink(mut self, sink: impl SampleSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn add_statistic(
        &mut self,
        name: impl Into<String>,
        statistic: StatisticChoice,
    ) -> Result<(), BuildError> {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return Err(BuildError::InvalidParameter(format!(
                "statistic {name} is already registered"
            )));
        }
        let function = StatisticFunction::new(statistic, &self.strategy)?;
        debug!("registered {name} ({})", function.kind());
        self.functions.insert(name, function);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn problem(&self) -> &RobustProblem {
        &self.problem
    }

    pub fn strategy(&self) -> &StrategyChoice {
        &self.strategy
    }

    /// Number of distinct consecutive designs estimated so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn estimate(
        &mut self,
        name: &str,
        design: ArrayView1<'_, f64>,
        with_jacobian: bool,
    ) -> Result<StatisticResult, StatisticError> {
        let function = self
            .functions
            .get_mut(name)
            .ok_or_else(|| StatisticError::UnknownStatistic(name.to_string()))?;
        let new_design = self.last_design.as_ref().is_none_or(|d| d.view() != design);
        let iteration = self.iteration + usize::from(new_design);
        let estimation = function.evaluate_at(&self.problem, design, with_jacobian, iteration)?;

        if new_design {
            self.iteration = iteration;
            self.last_design = Some(design.to_owned());
        }
        info!(
            "iteration {}: {name} = {}",
            self.iteration, estimation.result.value
        );

        if let (Some(sink), Some((inputs, outputs))) = (self.sink.as_mut(), estimation.samples) {
            let dataset =
                SampleDataset::new(self.iteration, name, design.to_owned(), inputs, outputs);
            sink.save(&dataset)?;
        }
        Ok(estimation.result)
    }
}
