use crate::domain::model::{
    round2, ChannelEntry, Forecast, ForecastMode, ForecastParams, ForecastRow, ForecastSummary,
};

/// Project every channel entry over the configured horizon.
///
/// Pure and stateless: the same entries and params always produce the same
/// table. Empty input yields an empty table with zero totals rather than an
/// error; the "add at least one entry" gate belongs to callers. Degenerate
/// divisions (no paid customers, zero churn, zero CAC) are reported as 0.
pub fn run_forecast(entries: &[ChannelEntry], params: &ForecastParams) -> Forecast {
    match params.mode {
        ForecastMode::ChurnAware => churn_aware(entries, params),
        ForecastMode::ShareApportioned => share_apportioned(entries, params),
    }
}

/// 逐通道模型：訪客數按成長率逐月複利，流失以當月一次性折減計入。
///
/// Each entry's trajectory is self-contained. Churn does not compound across
/// months: every month's customers derive fresh from that month's visitor
/// count, with the churn haircut applied once to the gross figures.
fn churn_aware(entries: &[ChannelEntry], params: &ForecastParams) -> Forecast {
    let mut rows = Vec::with_capacity(entries.len() * params.months as usize);
    let mut totals = ForecastSummary::default();

    let growth_factor = 1.0 + params.growth_rate / 100.0;

    for entry in entries {
        let conversion_to_trial = entry.conversion_to_trial / 100.0;
        let conversion_to_paid = entry.conversion_to_paid / 100.0;
        let churn = entry.churn_rate / 100.0;

        let mut site_visitors = entry.site_visitors;

        for month in 1..=params.months {
            let trials = site_visitors * conversion_to_trial;
            let mut paid_customers = trials * conversion_to_paid;
            let mut mrr = paid_customers * params.unit_price;

            // 當月流失折減
            mrr *= 1.0 - churn;
            paid_customers *= 1.0 - churn;

            let cac = if paid_customers > 0.0 {
                entry.cost / paid_customers
            } else {
                0.0
            };
            let ltv = if churn > 0.0 { (mrr * 12.0) / churn } else { 0.0 };
            let roi = if cac > 0.0 { (ltv - cac) / cac } else { 0.0 };

            let row = ForecastRow {
                month,
                channel: entry.channel.clone(),
                medium: entry.medium.clone(),
                site_visitors: round2(site_visitors),
                trials: round2(trials),
                paid_customers: round2(paid_customers),
                mrr: round2(mrr),
                cost: round2(entry.cost),
                cac: round2(cac),
                ltv: round2(ltv),
                roi: round2(roi),
            };

            // Totals accumulate the rounded row values so that
            // totals == sum(rows) holds exactly.
            totals.total_cost += row.cost;
            totals.total_mrr += row.mrr;
            totals.total_customers += row.paid_customers;
            rows.push(row);

            site_visitors *= growth_factor;
        }
    }

    Forecast {
        rows,
        summary: totals,
    }
}

/// 份額分攤模型：以首月各通道的 MRR 貢獻比例，將複利成長的
/// MRR 目標逐月回推各通道所需的訪客數。
///
/// Month-1 gross MRR fixes each entry's share for the whole horizon. The
/// aggregate target compounds by growth_rate from month 2; paid customers,
/// trials and visitors are back-computed through unit_price and the
/// conversion rates. This draft of the model predates churn handling, so
/// LTV and ROI carry the defined-as-0 value. Rows come out month-major.
fn share_apportioned(entries: &[ChannelEntry], params: &ForecastParams) -> Forecast {
    let mut rows = Vec::with_capacity(entries.len() * params.months as usize);
    let mut totals = ForecastSummary::default();

    let contributions: Vec<f64> = entries
        .iter()
        .map(|entry| {
            entry.site_visitors
                * (entry.conversion_to_trial / 100.0)
                * (entry.conversion_to_paid / 100.0)
                * params.unit_price
        })
        .collect();
    let initial_total: f64 = contributions.iter().sum();

    let mut target_mrr = initial_total;
    let growth_factor = 1.0 + params.growth_rate / 100.0;

    for month in 1..=params.months {
        if month != 1 {
            target_mrr *= growth_factor;
        }

        for (entry, contribution) in entries.iter().zip(&contributions) {
            let share = if initial_total > 0.0 {
                contribution / initial_total
            } else {
                0.0
            };
            let channel_mrr = share * target_mrr;

            let paid_customers = channel_mrr / params.unit_price;
            let trials = if entry.conversion_to_paid > 0.0 {
                paid_customers / (entry.conversion_to_paid / 100.0)
            } else {
                0.0
            };
            let site_visitors = if entry.conversion_to_trial > 0.0 {
                trials / (entry.conversion_to_trial / 100.0)
            } else {
                0.0
            };

            let cac = if paid_customers > 0.0 {
                entry.cost / paid_customers
            } else {
                0.0
            };

            let row = ForecastRow {
                month,
                channel: entry.channel.clone(),
                medium: entry.medium.clone(),
                site_visitors: round2(site_visitors),
                trials: round2(trials),
                paid_customers: round2(paid_customers),
                mrr: round2(channel_mrr),
                cost: round2(entry.cost),
                cac: round2(cac),
                ltv: 0.0,
                roi: 0.0,
            };

            totals.total_cost += row.cost;
            totals.total_mrr += row.mrr;
            totals.total_customers += row.paid_customers;
            rows.push(row);
        }
    }

    Forecast {
        rows,
        summary: totals,
    }
}
