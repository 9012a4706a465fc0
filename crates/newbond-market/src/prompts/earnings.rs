//! Earnings narrative fragments

use super::names;
use newbond_prompt::{JinjaTemplate, Result};

/// Vars: `name`, `ipo`, `industry`
pub fn company_intro() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::COMPANY_INTRO,
        "[Company Introduction]:\n\n{{ name }} went public on {{ ipo }} and operates in the {{ industry }} sector. ",
        "[기업소개]:\n\n{{ name }}은 {{ ipo }}에 상장한 {{ industry }}섹터의 기업입니다. ",
    )
}

/// Vars: `name`, `year`, `quarter`, `date`, `revenue_estimate` (millions), `eps_estimate`
pub fn upcoming_headline() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::UPCOMING_HEADLINE,
        "{{ name }} is scheduled to report Q{{ quarter }} {{ year }} earnings on {{ date }}. \
         Consensus expects revenue of ${{ revenue_estimate }}M and EPS of {{ eps_estimate }}. ",
        "{{ name }}의 {{ year }}년 {{ quarter }}분기 실적 발표일은 {{ date }}으로 예정되어 있습니다. \
         시장에서 예측하는 실적은 매출 ${{ revenue_estimate }}M, eps {{ eps_estimate }}입니다. ",
    )
}

/// Vars: `date`, `year`, `quarter`, `name`,
/// `eps` {`actual`, `estimate`, `surprise`, `beat`},
/// optional `revenue` {`actual`, `estimate`, `surprise`, `above`}.
/// Surprise values arrive preformatted (`"10.0%"` or `"N/A"`).
pub fn results_summary() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::RESULTS_SUMMARY,
        "\n [Earnings Summary]: \n {{ name }} reported Q{{ quarter }} {{ year }} results on {{ date }}. \
         {% if revenue %}Revenue of ${{ revenue.actual }}M came in {{ revenue.surprise }} \
         {% if revenue.above %}above{% else %}below{% endif %} the ${{ revenue.estimate }}M consensus; {% endif %}\
         EPS of {{ eps.actual }} {% if eps.beat %}beat{% else %}missed{% endif %} the {{ eps.estimate }} estimate by {{ eps.surprise }}. ",
        "\n [실적발표 요약]: \n {{ date }}에 {{ year }}년{{ quarter }}분기 {{ name }}의 실적이 발표되었습니다. \
         {% if revenue %}실적(매출)은 ${{ revenue.actual }}M으로 당초 예측한 ${{ revenue.estimate }}M 대비 {{ revenue.surprise }} \
         {% if revenue.above %}상회하였으며{% else %}하회하였으며{% endif %}, {% endif %}\
         eps는 예측한 {{ eps.estimate }}대비 {{ eps.actual }}으로 eps는 {{ eps.surprise }} \
         {% if eps.beat %}상회하였습니다.{% else %}하회하였습니다.{% endif %} ",
    )
}

/// Vars: `ticker`, `start`, `end`, `has_data`, `first`, `last`, `direction` (`up`/`down`/`flat`)
pub fn price_move() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::PRICE_MOVE,
        "{% if has_data %}From {{ start }} to {{ end }}, {{ ticker }} stock \
         {% if direction == 'up' %}rose{% elif direction == 'down' %}fell{% else %}was flat{% endif %} \
         from $ {{ first | fixed }} to $ {{ last | fixed }}. Related news follows.\
         {% else %}No {{ ticker }} price data from {{ start }} to {{ end }}. Related news follows.{% endif %}",
        "{% if has_data %}{{ start }}부터 {{ end }}까지 {{ ticker }}의 주식가격은, \
         $ {{ first | fixed }}에서 $ {{ last | fixed }}으로 \
         {% if direction == 'up' %}상승하였습니다{% elif direction == 'down' %}하락하였습니다{% else %}변동이 없었습니다{% endif %}. \
         관련된 뉴스는 다음과 같습니다.\
         {% else %}{{ start }}부터 {{ end }}까지 {{ ticker }}의 주가 데이터가 없습니다. 관련된 뉴스는 다음과 같습니다.{% endif %}",
    )
}

/// Vars: `headline`, `summary`
pub fn news_item() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::NEWS_ITEM,
        "[Headline]: {{ headline }} \n [Summary]: {{ summary }} \n",
        "[헤드라인]: {{ headline }} \n [요약]: {{ summary }} \n",
    )
}

/// Vars: `window` (`recent`/`before`/`after`/`after_seven`), `narrative`, `news` (rendered items)
pub fn window_section() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::WINDOW_SECTION,
        "{% if window == 'recent' %}Over the last 3 weeks,\
         {% elif window == 'before' %}Before the earnings call,\
         {% elif window == 'after' %}After the earnings call,\
         {% else %}More than 7 days after the earnings call,{% endif %} \
         {{ narrative }}: \n\n {% for item in news %}\n{{ item }}{% endfor %}",
        "{% if window == 'recent' %}최근 3주간\
         {% elif window == 'before' %}Earning call 전,\
         {% elif window == 'after' %}Earning call 후,\
         {% else %}Earning call 발표 7일 이후,{% endif %} \
         {{ narrative }}: \n\n {% for item in news %}\n{{ item }}{% endfor %}",
    )
}

pub fn no_third_window() -> Result<JinjaTemplate> {
    JinjaTemplate::bilingual(
        names::NO_THIRD_WINDOW,
        "Not enough time since the earnings announcement to monitor trends",
        "실적 발표 이후 추세를 확인하기에 충분한 시간이 지나지 않았습니다",
    )
}

/// Vars: `start`, `end`, `ticker`
pub fn pre_instruction() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::PRE_INSTRUCTION,
        "\n\n Based on all the information (from {{ start }} to {{ end }}), let's first analyze the \
         positive developments, potential concerns and stock price predictions for {{ ticker }}. \
         Come up with 5-7 most important factors respectively and keep them concise. \
         Most factors should be inferred from company related news. \
         Finally, make your prediction of the {{ ticker }} stock price movement for next month. \
         Provide a summary analysis to support your prediction.",
    )
}

/// Vars: `before_start`, `before_end`, `announced`, `today`, `ticker`
pub fn post_instruction() -> Result<JinjaTemplate> {
    JinjaTemplate::new(
        names::POST_INSTRUCTION,
        "\n\n Based on all the information before earning call (from {{ before_start }} to {{ before_end }}), \
         let's first analyze the positive developments, potential concerns and stock price predictions \
         for {{ ticker }}. Come up with 5-7 most important factors respectively and keep them concise. \
         Most factors should be inferred from company related news. \
         Then, based on all the information after earning call (from {{ announced }} to {{ today }}), \
         let's find 5-6 points that meet expectations and points that fall short of expectations \
         when compared before the earning call. \
         Finally, make your prediction of the {{ ticker }} stock price movement for next month. \
         Provide a summary analysis to support your prediction.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use newbond_prompt::{Language, PromptTemplate};
    use serde_json::json;

    #[test]
    fn test_results_summary_with_revenue() {
        let vars = json!({
            "date": "2024-02-01", "year": 2024, "quarter": 1, "name": "Apple Inc",
            "revenue": { "actual": 119575, "estimate": 117910, "surprise": "1.4%", "above": true },
            "eps": { "actual": 2.18, "estimate": 2.1, "surprise": "3.8%", "beat": true },
        });
        let ko = results_summary().unwrap().render(&Language::Korean, &vars).unwrap();
        assert_eq!(
            ko,
            "\n [실적발표 요약]: \n 2024-02-01에 2024년1분기 Apple Inc의 실적이 발표되었습니다. \
             실적(매출)은 $119575M으로 당초 예측한 $117910M 대비 1.4% 상회하였으며, \
             eps는 예측한 2.1대비 2.18으로 eps는 3.8% 상회하였습니다. "
        );
    }

    #[test]
    fn test_results_summary_without_revenue() {
        let vars = json!({
            "date": "2024-02-01", "year": 2024, "quarter": 1, "name": "Apple Inc",
            "revenue": null,
            "eps": { "actual": 1.9, "estimate": 2.1, "surprise": "9.5%", "beat": false },
        });
        let en = results_summary().unwrap().render(&Language::English, &vars).unwrap();
        assert!(!en.contains("Revenue"));
        assert!(en.contains("EPS of 1.9 missed the 2.1 estimate by 9.5%."));
    }

    #[test]
    fn test_price_move_wording() {
        let template = price_move().unwrap();
        let vars = json!({
            "ticker": "AAPL", "start": "2024-01-01", "end": "2024-01-22",
            "has_data": true, "first": 185.64, "last": 193.89, "direction": "up",
        });
        let ko = template.render(&Language::Korean, &vars).unwrap();
        assert_eq!(
            ko,
            "2024-01-01부터 2024-01-22까지 AAPL의 주식가격은, $ 185.64에서 $ 193.89으로 상승하였습니다. \
             관련된 뉴스는 다음과 같습니다."
        );

        let empty = json!({ "ticker": "AAPL", "start": "2024-01-01", "end": "2024-01-01", "has_data": false });
        let en = template.render(&Language::English, &empty).unwrap();
        assert!(en.starts_with("No AAPL price data"));
    }

    #[test]
    fn test_window_section_layout() {
        let vars = json!({
            "window": "recent",
            "narrative": "N",
            "news": ["[헤드라인]: A \n [요약]: a \n", "[헤드라인]: B \n [요약]: b \n"],
        });
        let ko = window_section().unwrap().render(&Language::Korean, &vars).unwrap();
        assert_eq!(
            ko,
            "최근 3주간 N: \n\n \n[헤드라인]: A \n [요약]: a \n\n[헤드라인]: B \n [요약]: b \n"
        );

        let after = json!({ "window": "after_seven", "narrative": "N", "news": [] });
        let ko = window_section().unwrap().render(&Language::Korean, &after).unwrap();
        assert_eq!(ko, "Earning call 발표 7일 이후, N: \n\n ");
    }
}
