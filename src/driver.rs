// Sequential driver: runs the seven service calls in a fixed order and
// writes one status line per call. A failed call is reported and the
// run moves on; only a failure to write output stops it.

use crate::api::{AccrualApi, Reply, Token};
use crate::fixtures::Scenario;
use anyhow::{Context, Result};
use std::fmt;
use std::io::Write;
use tracing::{debug, info, warn};

/// The remote operations, in the order they are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    Login,
    AddOrder,
    GetOrders,
    GetBalance,
    AddWithdraw,
    GetWithdrawals,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Register,
        Operation::Login,
        Operation::AddOrder,
        Operation::GetOrders,
        Operation::GetBalance,
        Operation::AddWithdraw,
        Operation::GetWithdrawals,
    ];

    /// Prefix of the status line.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Register => "REGISTER",
            Operation::Login => "LOGIN",
            Operation::AddOrder => "ADD ORDER",
            Operation::GetOrders => "GET ORDER",
            Operation::GetBalance => "GET BALANCE",
            Operation::AddWithdraw => "ADD withdraw",
            Operation::GetWithdrawals => "GET withdraws",
        }
    }

    /// Prefix of the error line. Same as the label except for register.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Operation::Register => "Registration",
            _ => self.label(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// The service answered, whatever the status code.
    Done(Reply),
    /// The request never got an answer.
    Failed(anyhow::Error),
}

impl Outcome {
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Outcome::Done(reply) => Some(reply),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct Step {
    pub operation: Operation,
    pub outcome: Outcome,
}

/// Result of a whole run: one step per operation attempted and the
/// token that was in effect after login.
#[derive(Debug, Default)]
pub struct Report {
    pub steps: Vec<Step>,
    pub token: Token,
}

impl Report {
    pub fn step(&self, operation: Operation) -> Option<&Step> {
        self.steps.iter().find(|s| s.operation == operation)
    }

    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_failed()).count()
    }

    fn record<W: Write>(
        &mut self,
        out: &mut W,
        operation: Operation,
        result: Result<Reply>,
    ) -> Result<()> {
        let outcome = match result {
            Ok(reply) => {
                debug!(%operation, status = reply.status.as_u16(), "reply received");
                writeln!(out, "{}: {}", operation, status_line(operation, &reply, &self.token))
                    .context("Failed to write status line")?;
                Outcome::Done(reply)
            }
            Err(err) => {
                let cause = format!("{err:#}");
                warn!(%operation, %cause, "request failed");
                writeln!(out, "{} error: {}", operation.error_prefix(), cause)
                    .context("Failed to write error line")?;
                out.flush().context("Failed to flush output")?;
                Outcome::Failed(err)
            }
        };
        self.steps.push(Step { operation, outcome });
        Ok(())
    }
}

fn status_line(operation: Operation, reply: &Reply, token: &Token) -> String {
    let code = reply.status.as_u16();
    match operation {
        Operation::Register | Operation::AddOrder => code.to_string(),
        Operation::Login => format!("{}, {}", code, token),
        _ => format!("{} {}", code, reply.body.as_deref().unwrap_or_default()),
    }
}

/// Run every operation once, in order, against `api`. Each call gets the
/// token captured by login; if login fails the empty token is used.
pub fn run<A: AccrualApi, W: Write>(api: &A, scenario: &Scenario, out: &mut W) -> Result<Report> {
    let mut report = Report::default();

    report.record(out, Operation::Register, api.register(&scenario.credentials))?;

    let login = api.login(&scenario.credentials).map(|login| {
        report.token = login.token;
        login.reply
    });
    report.record(out, Operation::Login, login)?;

    let token = report.token.clone();
    report.record(
        out,
        Operation::AddOrder,
        api.add_order(&token, &scenario.order_number),
    )?;
    report.record(out, Operation::GetOrders, api.orders(&token))?;
    report.record(out, Operation::GetBalance, api.balance(&token))?;
    report.record(
        out,
        Operation::AddWithdraw,
        api.withdraw(&token, &scenario.withdrawal),
    )?;
    report.record(out, Operation::GetWithdrawals, api.withdrawals(&token))?;

    info!(
        base_url = api.base_url(),
        failed = report.failures(),
        total = report.steps.len(),
        "smoke run finished"
    );
    Ok(report)
}
