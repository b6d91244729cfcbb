use log::debug;
use ndarray::{Array1, Array2, ArrayView1};

use crate::build::{
    BoxedEstimator, BuildError, build_control_variate_estimator, build_iterative_estimator,
    build_sampling_estimator, build_taylor_estimator,
};
use crate::config::{
    ControlVariateParameters, EstimationStrategy, SamplingParameters,
    SequentialSamplingParameters, StatisticChoice, StatisticKind, StrategyChoice,
    TaylorPolynomialParameters,
};
use crate::core::{FiniteDifferences, Model, SECOND_ORDER_STEP, StatisticError, StatisticResult};
use crate::estimators::control_variate::ControlVariateData;
use crate::estimators::iterative::Observation;
use crate::estimators::sampling::SampleBatch;
use crate::estimators::taylor_polynomial::TaylorData;
use crate::formulation::RobustProblem;

/// Result of one statistic function call, with the samples it used.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub result: StatisticResult,
    /// Uncertain draws and model outputs; `None` for strategies that do not sample.
    pub samples: Option<(Array2<f64>, Array2<f64>)>,
}

enum Strategy {
    Sampling(BoxedEstimator<SampleBatch>, SamplingParameters),
    IterativeSampling(BoxedEstimator<Observation>, SamplingParameters),
    SequentialSampling(BoxedEstimator<SampleBatch>, SequentialSamplingParameters),
    ControlVariate(BoxedEstimator<ControlVariateData>, ControlVariateParameters),
    TaylorPolynomial(BoxedEstimator<TaylorData>, TaylorPolynomialParameters),
}

/// A statistic of the model output seen as a function of the design.
pub struct StatisticFunction {
    statistic: StatisticChoice,
    strategy: Strategy,
}

impl StatisticFunction {
    pub fn new(statistic: StatisticChoice, strategy: &StrategyChoice) -> Result<Self, BuildError> {
        let strategy = match strategy {
            StrategyChoice::Sampling(p) => {
                Strategy::Sampling(build_sampling_estimator(&statistic)?, *p)
            }
            StrategyChoice::IterativeSampling(p) => {
                Strategy::IterativeSampling(build_iterative_estimator(&statistic)?, *p)
            }
            StrategyChoice::SequentialSampling(p) => {
                if p.initial_n_samples == 0
                    || p.n_samples_increment == 0
                    || p.initial_n_samples > p.n_samples
                {
                    return Err(BuildError::InvalidParameter(format!(
                        "sequential sampling needs 0 < initial_n_samples <= n_samples and a positive increment, got {p:?}"
                    )));
                }
                Strategy::SequentialSampling(build_sampling_estimator(&statistic)?, *p)
            }
            StrategyChoice::ControlVariate(p) => {
                FiniteDifferences::new(p.fd_step)?;
                Strategy::ControlVariate(build_control_variate_estimator(&statistic)?, *p)
            }
            StrategyChoice::TaylorPolynomial(p) => {
                FiniteDifferences::new(p.fd_step)?;
                Strategy::TaylorPolynomial(build_taylor_estimator(&statistic)?, *p)
            }
        };
        Ok(Self {
            statistic,
            strategy,
        })
    }

    pub fn kind(&self) -> StatisticKind {
        StatisticKind::from(&self.statistic)
    }

    pub fn strategy(&self) -> EstimationStrategy {
        match self.strategy {
            Strategy::Sampling(..) => EstimationStrategy::Sampling,
            Strategy::IterativeSampling(..) => EstimationStrategy::IterativeSampling,
            Strategy::SequentialSampling(..) => EstimationStrategy::SequentialSampling,
            Strategy::ControlVariate(..) => EstimationStrategy::ControlVariate,
            Strategy::TaylorPolynomial(..) => EstimationStrategy::TaylorPolynomial,
        }
    }

    pub fn statistic(&self) -> &StatisticChoice {
        &self.statistic
    }

    /// Estimates the statistic at `design`, with its Jacobian w.r.t. the
    /// design when `with_jacobian` is set.
    ///
    /// Sampling strategies reuse their seed at every call, so the estimate is
    /// a deterministic function of the design.
    pub fn evaluate(
        &mut self,
        problem: &RobustProblem,
        design: ArrayView1<'_, f64>,
        with_jacobian: bool,
    ) -> Result<Estimation, StatisticError> {
        self.evaluate_at(problem, design, with_jacobian, 1)
    }

    /// Same as [`evaluate`](Self::evaluate) at outer iteration `iteration`,
    /// which sets the sample size of sequential sampling.
    pub fn evaluate_at(
        &mut self,
        problem: &RobustProblem,
        design: ArrayView1<'_, f64>,
        with_jacobian: bool,
        iteration: usize,
    ) -> Result<Estimation, StatisticError> {
        problem.check_design(&design)?;
        if with_jacobian && self.kind() == StatisticKind::Probability {
            return Err(StatisticError::NotDifferentiable("probability"));
        }
        let with_reference = self.kind() == StatisticKind::Probability;
        match &mut self.strategy {
            Strategy::Sampling(estimator, p) => estimate_from_batch(
                estimator,
                problem,
                design,
                problem.draw(p.seed, p.n_samples),
                with_jacobian,
            ),
            Strategy::SequentialSampling(estimator, p) => {
                let n_samples = p.n_samples_at(iteration);
                debug!("iteration {iteration}: sequential sample size {n_samples}");
                estimate_from_batch(
                    estimator,
                    problem,
                    design,
                    problem.draw(p.seed, n_samples),
                    with_jacobian,
                )
            }
            Strategy::IterativeSampling(estimator, p) => {
                estimator.reset();
                let inputs = problem.draw(p.seed, p.n_samples);
                let (outputs, jacobians) = problem.sample(design, inputs.view(), with_jacobian)?;
                debug!("streaming {} outputs", outputs.nrows());
                let mut result = None;
                for (i, value) in outputs.rows().into_iter().enumerate() {
                    let observation = match &jacobians {
                        Some(j) => Observation::with_jacobian(
                            value.to_owned(),
                            j.index_axis(ndarray::Axis(0), i).to_owned(),
                        ),
                        None => Observation::new(value.to_owned()),
                    };
                    result = Some(estimator.estimate(&observation)?);
                }
                Ok(Estimation {
                    result: result.ok_or(StatisticError::EmptySample)?,
                    samples: Some((inputs, outputs)),
                })
            }
            Strategy::ControlVariate(estimator, p) => {
                let data = control_variate_data(problem, design, p, with_reference)?;
                let mut result = estimator.estimate(&data)?;
                if with_jacobian {
                    let fd = FiniteDifferences::new(p.fd_step)?;
                    result.jacobian = Some(fd.differentiate(design, |d| {
                        let data = control_variate_data(problem, d, p, false)?;
                        Ok(estimator.estimate(&data)?.value)
                    })?);
                }
                Ok(Estimation {
                    result,
                    samples: Some((data.inputs, data.samples)),
                })
            }
            Strategy::TaylorPolynomial(estimator, p) => {
                let fd = FiniteDifferences::new(p.fd_step.max(SECOND_ORDER_STEP))?;
                let data = taylor_data(problem, design, p, &fd)?;
                let mut result = estimator.estimate(&data)?;
                if with_jacobian {
                    result.jacobian = Some(fd.central_differentiate(design, |d| {
                        Ok(estimator.estimate(&taylor_data(problem, d, p, &fd)?)?.value)
                    })?);
                }
                Ok(Estimation {
                    result,
                    samples: None,
                })
            }
        }
    }
}

fn estimate_from_batch(
    estimator: &mut BoxedEstimator<SampleBatch>,
    problem: &RobustProblem,
    design: ArrayView1<'_, f64>,
    inputs: Array2<f64>,
    with_jacobian: bool,
) -> Result<Estimation, StatisticError> {
    let (outputs, jacobians) = problem.sample(design, inputs.view(), with_jacobian)?;
    debug!("sampled {} outputs", outputs.nrows());
    let batch = match jacobians {
        Some(j) => SampleBatch::with_jacobians(outputs.clone(), j)?,
        None => SampleBatch::new(outputs.clone())?,
    };
    Ok(Estimation {
        result: estimator.estimate(&batch)?,
        samples: Some((inputs, outputs)),
    })
}

fn control_variate_data(
    problem: &RobustProblem,
    design: ArrayView1<'_, f64>,
    p: &ControlVariateParameters,
    with_reference: bool,
) -> Result<ControlVariateData, StatisticError> {
    let inputs = problem.draw(p.seed, p.n_samples);
    let (samples, _) = problem.sample(design, inputs.view(), false)?;
    let fixed = problem.at_design(design);
    let input_mean = problem.space().mean();
    let mean_value = fixed.evaluate(input_mean.view())?;
    let mean_jacobian = fixed.jacobian(input_mean.view())?;
    Ok(ControlVariateData {
        samples,
        inputs,
        input_standard_deviation: problem.space().standard_deviation(),
        mean_value,
        mean_jacobian,
        reference_inputs: with_reference
            .then(|| problem.draw(p.seed.wrapping_add(1), p.n_reference_samples)),
        input_mean,
    })
}

fn taylor_data(
    problem: &RobustProblem,
    design: ArrayView1<'_, f64>,
    p: &TaylorPolynomialParameters,
    fd: &FiniteDifferences,
) -> Result<TaylorData, StatisticError> {
    let fixed = problem.at_design(design);
    let mean: Array1<f64> = problem.space().mean();
    Ok(TaylorData {
        value: fixed.evaluate(mean.view())?,
        jacobian: fixed.jacobian(mean.view())?,
        hessian: if p.second_order {
            Some(fd.hessian(&fixed, mean.view())?)
        } else {
            None
        },
        input_standard_deviation: problem.space().standard_deviation(),
    })
}
