//! Command execution.

use anyhow::{Context, Result, bail};
use ledger_application::{AuthGate, BudgetApi, GateDecision, ResourceApi, Session};
use ledger_domain::budget::{
    Budget, BudgetCategory, BudgetStatus, DailySpending, Income, MiscellaneousCost, Period, Record,
};
use ledger_domain::{Credentials, Route};
use tracing::{debug, info};

use crate::cli::{Cli, Command, PeriodFilter};

/// One printable line per record.
trait Row {
    fn row(&self) -> String;
}

fn id(id: Option<u64>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

impl Row for Period {
    fn row(&self) -> String {
        let savings = self
            .total_savings
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        format!(
            "{:>5}  {}  {}..{}  savings {savings}",
            id(self.id),
            self.name,
            self.start_date,
            self.end_date
        )
    }
}

impl Row for Income {
    fn row(&self) -> String {
        format!(
            "{:>5}  {}  {}  {}",
            id(self.id),
            self.date_received,
            self.source,
            self.amount
        )
    }
}

impl Row for BudgetCategory {
    fn row(&self) -> String {
        format!("{:>5}  {}", id(self.id), self.name)
    }
}

impl Row for Budget {
    fn row(&self) -> String {
        let category = self.category.as_ref().map_or_else(
            || format!("category {}", id(self.category_id)),
            |c| c.name.clone(),
        );
        let status = match self.status {
            BudgetStatus::Paid => "paid",
            BudgetStatus::NotPaid => "not paid",
        };
        let due = self
            .due_date
            .map_or_else(String::new, |d| format!("  due {d}"));
        format!(
            "{:>5}  {category}  {}  {status}{due}",
            id(self.id),
            self.amount_allocated
        )
    }
}

impl Row for DailySpending {
    fn row(&self) -> String {
        let over = if self.is_over_limit == Some(true) {
            "  over limit"
        } else {
            ""
        };
        format!(
            "{:>5}  {}  spent {} of {}{over}",
            id(self.id),
            self.date,
            self.spent_amount,
            self.fixed_daily_limit
        )
    }
}

impl Row for MiscellaneousCost {
    fn row(&self) -> String {
        format!("{:>5}  {}  {}", id(self.id), self.title, self.amount)
    }
}

/// Runs the parsed command against `session`.
///
/// # Errors
///
/// Returns an error if signing in fails or an API call fails.
pub async fn run(session: &Session, cli: &Cli) -> Result<()> {
    let state = session.bootstrap().await;
    info!(%state, "bootstrap finished");

    let api = BudgetApi::new(session.client());
    if !cli.command.requires_session() {
        return public(session, &api, cli).await;
    }

    ensure_dashboard(session, cli).await?;
    let listed = list(&api, &cli.command).await;
    // The listing result wins; `Session::logout` already warned on failure.
    if let Err(err) = session.logout().await {
        debug!(error = %err, "ignoring logout failure");
    }
    listed
}

async fn public(session: &Session, api: &BudgetApi, cli: &Cli) -> Result<()> {
    match cli.command {
        Command::Status => println!("{}", session.state()),
        Command::Signup => {
            let account = api
                .account
                .signup(&credentials(cli)?)
                .await
                .context("signup failed")?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        _ => {}
    }
    Ok(())
}

async fn list(api: &BudgetApi, command: &Command) -> Result<()> {
    match command {
        Command::Periods => print_all(&api.periods, None).await,
        Command::Incomes(PeriodFilter { period }) => print_all(&api.incomes, *period).await,
        Command::Categories => print_all(&api.categories, None).await,
        Command::Budgets(PeriodFilter { period }) => print_all(&api.budgets, *period).await,
        Command::Spendings(PeriodFilter { period }) => print_all(&api.spendings, *period).await,
        Command::MiscCosts => print_all(&api.misc_costs, None).await,
        Command::Status | Command::Signup => Ok(()),
    }
}

async fn print_all<R: Record + Row>(resource: &ResourceApi<R>, period: Option<u64>) -> Result<()> {
    let records = match period {
        Some(period) => resource.list_for_period(period).await,
        None => resource.list(&[]).await,
    }
    .with_context(|| format!("listing {} failed", R::COLLECTION.trim_end_matches('/')))?;

    if records.is_empty() {
        println!("No results found.");
    }
    for record in &records {
        println!("{}", record.row());
    }
    Ok(())
}

/// Signs in if needed, then checks the dashboard is reachable.
async fn ensure_dashboard(session: &Session, cli: &Cli) -> Result<()> {
    let dashboard = Route::Dashboard;
    match session.gate().navigate(dashboard.path()).await {
        GateDecision::Render(_) => Ok(()),
        GateDecision::Redirect { to: Route::Login, from } => {
            session
                .login(&credentials(cli)?)
                .await
                .context("login failed")?;
            let target = AuthGate::post_login_target(from.as_deref());
            match session.gate().evaluate(target.path()) {
                GateDecision::Render(_) => Ok(()),
                other => bail!("dashboard still unavailable after login: {other:?}"),
            }
        }
        other => bail!("unexpected route decision: {other:?}"),
    }
}

fn credentials(cli: &Cli) -> Result<Credentials> {
    let (Some(username), Some(password)) = (&cli.username, &cli.password) else {
        bail!("not signed in: pass --username and set LEDGER_PASSWORD");
    };
    Credentials::new(username.as_str(), password.as_str()).context("invalid credentials")
}
