use crate::solver::PuzzleSolver;

/// Built-in puzzles with their expected answers, used by
/// `moltmint solve --self-test`.
pub const SELF_TEST_CHALLENGES: [(&str, &str); 5] = [
    (
        "A lobster claw exerts twenty newtons of force and gains ten newtons during molting. What is the total force?",
        "30.00",
    ),
    (
        "A crab walks at fifteen centimeters per second and increases speed by five centimeters per second. What is the new speed?",
        "20.00",
    ),
    (
        "A shark swims thirty meters, then swims twelve more meters. What is the total distance?",
        "42.00",
    ),
    (
        "A turtle moves seven centimeters per second and slows down by two centimeters per second. What is the new speed?",
        "5.00",
    ),
    (
        "A seagull has nine shells and picks up three more shells. How many shells does it have now?",
        "12.00",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestResult {
    pub problem: &'static str,
    pub expected: &'static str,
    /// Solver answer, or the error text when solving failed.
    pub got: Result<String, String>,
}

impl SelfTestResult {
    pub fn passed(&self) -> bool {
        self.got.as_deref() == Ok(self.expected)
    }
}

pub async fn run_self_test(solver: &PuzzleSolver) -> Vec<SelfTestResult> {
    let mut results = Vec::with_capacity(SELF_TEST_CHALLENGES.len());
    for (problem, expected) in SELF_TEST_CHALLENGES {
        let got = solver
            .solve(problem)
            .await
            .map_err(|err| format!("{err:#}"));
        results.push(SelfTestResult {
            problem,
            expected,
            got,
        });
    }
    results
}
