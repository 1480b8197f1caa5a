/// What the problem formulation needs to know about the dike-network
/// simulator: the dike rings it models and its planning steps.
pub trait DikeNetwork {
    fn planning_steps(&self) -> &[u32];
    fn dike_list(&self) -> &[String];
}

/// Five dike rings `A.1`..`A.5` over three planning steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardDikeNetwork {
    planning_steps: Vec<u32>,
    dikes: Vec<String>,
}

impl Default for StandardDikeNetwork {
    fn default() -> Self {
        Self {
            planning_steps: vec![0, 1, 2],
            dikes: (1..=5).map(|i| format!("A.{i}")).collect(),
        }
    }
}

impl StandardDikeNetwork {
    pub fn new(planning_steps: Vec<u32>, dikes: Vec<String>) -> Self {
        Self {
            planning_steps,
            dikes,
        }
    }
}

impl DikeNetwork for StandardDikeNetwork {
    fn planning_steps(&self) -> &[u32] {
        &self.planning_steps
    }

    fn dike_list(&self) -> &[String] {
        &self.dikes
    }
}
