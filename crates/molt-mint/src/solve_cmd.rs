use anyhow::{Result, bail};
use mint_config::MintSettings;
use mint_solver::{SelfTestResult, run_self_test};

use crate::live;

pub(crate) async fn handle_solve(
    settings: &MintSettings,
    self_test: bool,
    challenge: Option<String>,
) -> Result<()> {
    let solver = live::puzzle_solver(settings);
    if !self_test {
        let challenge = challenge.unwrap_or_default();
        println!("{}", solver.solve(&challenge).await?);
        return Ok(());
    }

    let results = run_self_test(&solver).await;
    for (n, result) in results.iter().enumerate() {
        println!("{}", format_result(n + 1, result));
    }
    let failed = results.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        bail!("{failed} of {} self-test puzzles failed", results.len());
    }
    println!("All {} self-test puzzles passed.", results.len());
    Ok(())
}

fn format_result(n: usize, result: &SelfTestResult) -> String {
    let status = if result.passed() { "PASS" } else { "FAIL" };
    let got = match &result.got {
        Ok(answer) => answer.clone(),
        Err(err) => format!("error: {err}"),
    };
    format!(
        "[{status}] #{n} expected={} got={got}\n       {}",
        result.expected, result.problem
    )
}
