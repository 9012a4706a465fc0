//! Company news digests

use crate::api::CompanyNews;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// How a digest is cut down when the provider returns too many articles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum NewsSampling {
    /// Uniform sample without replacement; a seed makes it reproducible
    Random { seed: Option<u64> },
    /// The newest articles
    MostRecent,
}

impl Default for NewsSampling {
    fn default() -> Self {
        Self::Random { seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub headline: String,
    pub summary: String,
}

/// Up to `count` articles for one window, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewsDigest {
    items: Vec<NewsItem>,
}

impl NewsDigest {
    pub fn from_articles(mut articles: Vec<CompanyNews>, count: usize, sampling: NewsSampling) -> Self {
        if articles.len() > count {
            articles = match sampling {
                NewsSampling::Random { seed } => {
                    let mut rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(seed),
                        None => StdRng::from_entropy(),
                    };
                    articles.choose_multiple(&mut rng, count).cloned().collect()
                }
                NewsSampling::MostRecent => {
                    articles.sort_by(|a, b| b.datetime.cmp(&a.datetime));
                    articles.truncate(count);
                    articles
                }
            };
        }
        articles.sort_by(|a, b| b.datetime.cmp(&a.datetime));

        Self {
            items: articles
                .into_iter()
                .map(|a| NewsItem {
                    headline: a.headline,
                    summary: a.summary,
                })
                .collect(),
        }
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
