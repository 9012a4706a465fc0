//! Earnings narrative builder
//!
//! Picks the announcement nearest to today from the earnings calendar, then
//! builds an analyst prompt for one of two phases:
//!
//! - pre-announcement: consensus headline plus the last three weeks of price
//!   action and news;
//! - post-announcement: results summary plus price action and news before
//!   the call, during the week after it and (once a week has passed) since.

mod analyst;
mod calendar;
mod news;
mod price;
mod surprise;
mod windows;

pub use analyst::{AnalysisReport, EarningsAnalyst};
pub use calendar::{EarningsPhase, EarningsWindow, calendar_range, select_nearest};
pub use news::{NewsDigest, NewsItem, NewsSampling};
pub use price::{PriceDirection, PriceMove};
pub use surprise::{
    EarningsSurprise, EpsComparison, RevenueComparison, format_surprise, surprise_percent,
    to_millions,
};
pub use windows::{DateWindow, PostAnnouncementWindows, recent_window};

use crate::api::{CompanyDataSource, CompanyProfile, PriceSource};
use crate::error::Result;
use crate::prompts::names;
use chrono::NaiveDate;
use newbond_prompt::PromptRegistry;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Headlines per window unless configured otherwise
pub const DEFAULT_NEWS_COUNT: usize = 20;

/// Everything the LLM call needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptBundle {
    pub phase: EarningsPhase,
    /// Company introduction plus the headline or results summary
    pub company_intro: String,
    /// Window narratives with their news digests
    pub news_section: String,
    pub full_prompt: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone, Copy)]
enum WindowKind {
    Recent,
    Before,
    After,
    AfterSeven,
}

impl WindowKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Before => "before",
            Self::After => "after",
            Self::AfterSeven => "after_seven",
        }
    }
}

pub struct EarningsNarrativeBuilder {
    company: Arc<dyn CompanyDataSource>,
    prices: Arc<dyn PriceSource>,
    prompts: Arc<PromptRegistry>,
    news_count: usize,
    sampling: NewsSampling,
}

impl EarningsNarrativeBuilder {
    pub fn new(
        company: Arc<dyn CompanyDataSource>,
        prices: Arc<dyn PriceSource>,
        prompts: Arc<PromptRegistry>,
    ) -> Self {
        Self {
            company,
            prices,
            prompts,
            news_count: DEFAULT_NEWS_COUNT,
            sampling: NewsSampling::default(),
        }
    }

    pub fn with_news_count(mut self, count: usize) -> Self {
        self.news_count = count;
        self
    }

    pub fn with_sampling(mut self, sampling: NewsSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Build the prompt as of the local calendar day
    pub async fn build_prompt(&self, ticker: &str) -> Result<PromptBundle> {
        self.build_prompt_on(ticker, chrono::Local::now().date_naive())
            .await
    }

    #[instrument(skip(self))]
    pub async fn build_prompt_on(&self, ticker: &str, today: NaiveDate) -> Result<PromptBundle> {
        let (from, to) = calendar_range(today);
        let (profile, entries) = tokio::try_join!(
            self.company.company_profile(ticker),
            self.company.earnings_calendar(ticker, from, to)
        )?;

        let window = EarningsWindow::from_entry(select_nearest(&entries, today)?)?;
        let intro = self.prompts.render(
            names::COMPANY_INTRO,
            &json!({
                "name": profile.name,
                "ipo": profile.ipo,
                "industry": profile.finnhub_industry,
            }),
        )?;
        info!(ticker, phase = ?window.phase(), announced = %window.announcement_date, "Selected earnings window");

        match EarningsSurprise::from_window(&window) {
            None => self.pre_announcement(ticker, today, &profile, &window, intro).await,
            Some(surprise) => {
                self.post_announcement(ticker, today, &profile, &window, &surprise, intro)
                    .await
            }
        }
    }

    async fn pre_announcement(
        &self,
        ticker: &str,
        today: NaiveDate,
        profile: &CompanyProfile,
        window: &EarningsWindow,
        intro: String,
    ) -> Result<PromptBundle> {
        let headline = self.prompts.render(
            names::UPCOMING_HEADLINE,
            &json!({
                "name": profile.name,
                "year": window.fiscal_year,
                "quarter": window.fiscal_quarter,
                "date": window.announcement_date.to_string(),
                "revenue_estimate": to_millions(window.revenue_estimate),
                "eps_estimate": window.eps_estimate,
            }),
        )?;

        let recent = recent_window(today);
        let news_section = self.window_section(ticker, recent, WindowKind::Recent).await?;
        let instruction = self.prompts.render(
            names::PRE_INSTRUCTION,
            &json!({
                "start": recent.start.to_string(),
                "end": recent.end.to_string(),
                "ticker": ticker,
            }),
        )?;

        self.bundle(EarningsPhase::PreAnnouncement, intro + "\n" + &headline, news_section, &instruction)
    }

    async fn post_announcement(
        &self,
        ticker: &str,
        today: NaiveDate,
        profile: &CompanyProfile,
        window: &EarningsWindow,
        surprise: &EarningsSurprise,
        intro: String,
    ) -> Result<PromptBundle> {
        let summary = self.prompts.render(
            names::RESULTS_SUMMARY,
            &json!({
                "date": window.announcement_date.to_string(),
                "year": window.fiscal_year,
                "quarter": window.fiscal_quarter,
                "name": profile.name,
                "eps": surprise.eps,
                "revenue": surprise.revenue,
            }),
        )?;

        let windows = PostAnnouncementWindows::new(window.announcement_date, today);
        let third = async {
            match windows.after_seven {
                Some(w) => self.window_section(ticker, w, WindowKind::AfterSeven).await,
                None => Ok(self.prompts.render(names::NO_THIRD_WINDOW, &json!({}))?),
            }
        };
        let (before, after, third) = tokio::try_join!(
            self.window_section(ticker, windows.before, WindowKind::Before),
            self.window_section(ticker, windows.after, WindowKind::After),
            third
        )?;

        let instruction = self.prompts.render(
            names::POST_INSTRUCTION,
            &json!({
                "before_start": windows.before.start.to_string(),
                "before_end": windows.before.end.to_string(),
                "announced": window.announcement_date.to_string(),
                "today": today.to_string(),
                "ticker": ticker,
            }),
        )?;

        let news_section = format!("{before}\n{after}\n{third}");
        self.bundle(EarningsPhase::PostAnnouncement, intro + "\n" + &summary, news_section, &instruction)
    }

    fn bundle(
        &self,
        phase: EarningsPhase,
        company_intro: String,
        news_section: String,
        instruction: &str,
    ) -> Result<PromptBundle> {
        let system_name = match phase {
            EarningsPhase::PreAnnouncement => names::SYSTEM_PRE,
            EarningsPhase::PostAnnouncement => names::SYSTEM_POST,
        };
        let system_prompt = self.prompts.render(
            system_name,
            &json!({ "language": self.prompts.default_language().name() }),
        )?;
        let full_prompt = format!("{company_intro}\n{news_section}\n{instruction}");

        Ok(PromptBundle {
            phase,
            company_intro,
            news_section,
            full_prompt,
            system_prompt,
        })
    }

    /// Price narrative plus news digest for one window
    async fn window_section(&self, ticker: &str, window: DateWindow, kind: WindowKind) -> Result<String> {
        let (bars, articles) = tokio::try_join!(
            self.prices.price_history(ticker, window.start, window.end),
            self.company.company_news(ticker, window.start, window.end)
        )?;
        debug!(ticker, window = kind.as_str(), bars = bars.len(), articles = articles.len(), "Fetched window data");

        let movement = PriceMove::from_bars(&bars);
        let narrative = self.prompts.render(
            names::PRICE_MOVE,
            &json!({
                "ticker": ticker,
                "start": window.start.to_string(),
                "end": window.end.to_string(),
                "has_data": movement.is_some(),
                "first": movement.map(|m| m.first),
                "last": movement.map(|m| m.last),
                "direction": movement.map(|m| m.direction.as_str()),
            }),
        )?;

        let digest = NewsDigest::from_articles(articles, self.news_count, self.sampling);
        let news = digest
            .items()
            .iter()
            .map(|item| self.prompts.render(names::NEWS_ITEM, &json!(item)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(self.prompts.render(
            names::WINDOW_SECTION,
            &json!({
                "window": kind.as_str(),
                "narrative": narrative,
                "news": news,
            }),
        )?)
    }
}
