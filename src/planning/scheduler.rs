//! Plan scheduler - groups planned jobs into waves that may run together

use crate::planning::plan::PipelinePlan;
use std::collections::{HashMap, HashSet};

/// Strategy for ordering planned jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingStrategy {
    /// A stage starts once every job of the previous stage is done
    StageOrder,

    /// Jobs with `needs` start as soon as their needs are done
    Needs,
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::StageOrder
    }
}

/// Scheduler for grouping a plan into waves
pub struct PlanScheduler {
    strategy: SchedulingStrategy,
}

impl PlanScheduler {
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self { strategy }
    }

    /// Groups of job names that may run concurrently, in order
    pub fn waves(&self, plan: &PipelinePlan) -> Vec<Vec<String>> {
        match self.strategy {
            SchedulingStrategy::StageOrder => Self::stage_waves(plan),
            SchedulingStrategy::Needs => Self::needs_waves(plan),
        }
    }

    fn stage_waves(plan: &PipelinePlan) -> Vec<Vec<String>> {
        plan.stages
            .iter()
            .map(|stage| stage.jobs.iter().map(|job| job.name.clone()).collect())
            .collect()
    }

    fn needs_waves(plan: &PipelinePlan) -> Vec<Vec<String>> {
        // A job without `needs` waits for every job of the earlier stages
        let mut prerequisites: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut earlier: Vec<&str> = Vec::new();
        for stage in &plan.stages {
            for job in &stage.jobs {
                let required = match &job.needs {
                    Some(needs) => needs.iter().map(String::as_str).collect(),
                    None => earlier.clone(),
                };
                prerequisites.insert(job.name.as_str(), required);
            }
            earlier.extend(stage.jobs.iter().map(|job| job.name.as_str()));
        }

        let mut done: HashSet<&str> = HashSet::new();
        let mut waves = Vec::new();

        while done.len() < earlier.len() {
            let ready: Vec<&str> = plan
                .jobs()
                .map(|job| job.name.as_str())
                .filter(|name| !done.contains(name))
                .filter(|name| {
                    prerequisites
                        .get(name)
                        .map(|required| required.iter().all(|r| done.contains(r)))
                        .unwrap_or(true)
                })
                .collect();

            // Cycles are rejected by validation
            if ready.is_empty() {
                break;
            }

            done.extend(ready.iter().copied());
            waves.push(ready.into_iter().map(str::to_string).collect());
        }

        waves
    }
}
