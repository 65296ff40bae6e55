//! Registration pricing evaluator.
//!
//! A configuration defines three contiguous tiers:
//!
//! ```text
//! early    [early_dt,   regular_dt]
//! regular  [regular_dt, late_dt   ]
//! late     [late_dt,    event end ]
//! ```
//!
//! Containment is inclusive at both ends, so a boundary instant belongs to both
//! neighbouring tiers. Price lookups walk the tiers in the order above and keep
//! the last match, which makes the later tier win on a shared boundary.
//!
//! The owning event's end, passed explicitly as a [`RegistrationWindow`], closes
//! the late tier and caps the other two, so nothing is open once the event is
//! over. `None` means the configuration is not attached to an
//! event yet: it is never open and costs nothing.

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, DomainResult, Money};

use crate::configuration::RegistrationConfiguration;

/// Named pricing tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingTier {
    Early,
    Regular,
    Late,
}

impl PricingTier {
    /// Evaluation order.
    pub const ALL: [PricingTier; 3] = [PricingTier::Early, PricingTier::Regular, PricingTier::Late];

    pub fn as_str(self) -> &'static str {
        match self {
            PricingTier::Early => "early",
            PricingTier::Regular => "regular",
            PricingTier::Late => "late",
        }
    }
}

impl fmt::Display for PricingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "early" => Ok(PricingTier::Early),
            "regular" => Ok(PricingTier::Regular),
            "late" => Ok(PricingTier::Late),
            other => Err(DomainError::validation(format!("unknown pricing tier: {other}"))),
        }
    }
}

/// One tier resolved against a concrete end boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TierWindow {
    pub tier: PricingTier,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub price: Money,
}

impl TierWindow {
    /// Inclusive on both ends.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

/// Whatever supplies the final tier boundary: normally the owning event.
pub trait RegistrationWindow {
    fn end_dt(&self) -> DateTime<Utc>;
}

impl RegistrationWindow for eventdesk_calendar::Event {
    fn end_dt(&self) -> DateTime<Utc> {
        eventdesk_calendar::Event::end_dt(self)
    }
}

impl RegistrationWindow for DateTime<Utc> {
    fn end_dt(&self) -> DateTime<Utc> {
        *self
    }
}

impl<W: RegistrationWindow + ?Sized> RegistrationWindow for &W {
    fn end_dt(&self) -> DateTime<Utc> {
        (**self).end_dt()
    }
}

/// Tier boundaries and prices, as entered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSchedule {
    pub early_dt: DateTime<Utc>,
    pub regular_dt: DateTime<Utc>,
    pub late_dt: DateTime<Utc>,
    pub early_price: Money,
    pub regular_price: Money,
    pub late_price: Money,
}

impl PricingSchedule {
    /// Boundaries must be non-decreasing.
    pub fn validate(&self) -> DomainResult<()> {
        if self.early_dt > self.regular_dt {
            return Err(DomainError::validation("early date must not be after regular date"));
        }
        if self.regular_dt > self.late_dt {
            return Err(DomainError::validation("regular date must not be after late date"));
        }
        Ok(())
    }

    pub fn price_of(&self, tier: PricingTier) -> Money {
        match tier {
            PricingTier::Early => self.early_price,
            PricingTier::Regular => self.regular_price,
            PricingTier::Late => self.late_price,
        }
    }

    /// Resolve the three tiers against the final boundary `end`.
    ///
    /// Every tier is cut off at `end`; a tier starting after it is empty.
    pub fn tiers(&self, end: DateTime<Utc>) -> [TierWindow; 3] {
        [
            TierWindow {
                tier: PricingTier::Early,
                start: self.early_dt,
                end: self.regular_dt.min(end),
                price: self.early_price,
            },
            TierWindow {
                tier: PricingTier::Regular,
                start: self.regular_dt,
                end: self.late_dt.min(end),
                price: self.regular_price,
            },
            TierWindow {
                tier: PricingTier::Late,
                start: self.late_dt,
                end,
                price: self.late_price,
            },
        ]
    }

    /// The last tier (in evaluation order) containing `now`.
    pub fn active_tier(&self, end: DateTime<Utc>, now: DateTime<Utc>) -> Option<TierWindow> {
        self.tiers(end).into_iter().filter(|t| t.contains(now)).last()
    }
}

/// Whether `now` falls inside any tier. Detached configurations never do.
pub fn within_time<W>(config: &RegistrationConfiguration, event: Option<&W>, now: DateTime<Utc>) -> bool
where
    W: RegistrationWindow + ?Sized,
{
    let Some(event) = event else {
        return false;
    };
    config
        .schedule()
        .tiers(event.end_dt())
        .iter()
        .any(|t| t.contains(now))
}

/// `enabled` and within a tier.
pub fn is_open<W>(config: &RegistrationConfiguration, event: Option<&W>, now: DateTime<Utc>) -> bool
where
    W: RegistrationWindow + ?Sized,
{
    config.enabled() && within_time(config, event, now)
}

/// Price of the tier containing `now`; later tiers win on shared boundaries.
///
/// Zero when no tier matches or the configuration is detached. Ignores
/// `enabled`.
pub fn current_price<W>(config: &RegistrationConfiguration, event: Option<&W>, now: DateTime<Utc>) -> Money
where
    W: RegistrationWindow + ?Sized,
{
    event
        .and_then(|e| config.schedule().active_tier(e.end_dt(), now))
        .map(|t| t.price)
        .unwrap_or_default()
}

/// Direct price lookup by tier name ("early", "regular", "late").
pub fn price_for_tier(config: &RegistrationConfiguration, tier_name: &str) -> Option<Money> {
    tier_name
        .parse::<PricingTier>()
        .ok()
        .map(|tier| config.schedule().price_of(tier))
}

/// Availability gate: `enabled` and the owning event has not ended yet.
///
/// Detached configurations are only gated on `enabled`.
pub fn available<W>(config: &RegistrationConfiguration, event: Option<&W>, now: DateTime<Utc>) -> bool
where
    W: RegistrationWindow + ?Sized,
{
    if !config.enabled() {
        return false;
    }
    match event {
        Some(event) => now <= event.end_dt(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    use crate::configuration::RegistrationConfigurationId;

    fn day(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2011, m, d, 0, 0, 0).unwrap()
    }

    fn schedule() -> PricingSchedule {
        PricingSchedule {
            early_dt: day(1, 1),
            regular_dt: day(2, 1),
            late_dt: day(3, 1),
            early_price: Money::from_cents(1000),
            regular_price: Money::from_cents(2000),
            late_price: Money::from_cents(3000),
        }
    }

    fn config(enabled: bool) -> RegistrationConfiguration {
        RegistrationConfiguration::configured(
            RegistrationConfigurationId::generate(),
            schedule(),
            0,
            enabled,
            Vec::new(),
            day(1, 1),
        )
        .unwrap()
    }

    fn end() -> DateTime<Utc> {
        day(4, 1)
    }

    #[test]
    fn mid_early_tier_is_open_at_early_price() {
        let cfg = config(true);
        let now = day(1, 15);
        assert!(is_open(&cfg, Some(&end()), now));
        assert_eq!(current_price(&cfg, Some(&end()), now), Money::from_cents(1000));
    }

    #[test]
    fn boundary_instant_takes_later_tier_price() {
        let cfg = config(true);
        let now = day(2, 1);
        let containing: Vec<_> = schedule()
            .tiers(end())
            .into_iter()
            .filter(|t| t.contains(now))
            .map(|t| t.tier)
            .collect();
        assert_eq!(containing, vec![PricingTier::Early, PricingTier::Regular]);
        assert!(is_open(&cfg, Some(&end()), now));
        assert_eq!(current_price(&cfg, Some(&end()), now), Money::from_cents(2000));
    }

    #[test]
    fn event_end_is_still_inside_late_tier() {
        let cfg = config(true);
        assert!(within_time(&cfg, Some(&end()), end()));
        assert_eq!(current_price(&cfg, Some(&end()), end()), Money::from_cents(3000));
        assert!(available(&cfg, Some(&end()), end()));
    }

    #[test]
    fn after_event_end_is_closed_and_free() {
        let cfg = config(true);
        let now = day(5, 1);
        assert!(!within_time(&cfg, Some(&end()), now));
        assert!(!is_open(&cfg, Some(&end()), now));
        assert!(!available(&cfg, Some(&end()), now));
        assert_eq!(current_price(&cfg, Some(&end()), now), Money::zero());
    }

    #[test]
    fn before_early_date_is_closed() {
        let cfg = config(true);
        let now = Utc.with_ymd_and_hms(2010, 12, 31, 23, 59, 59).unwrap();
        assert!(!is_open(&cfg, Some(&end()), now));
        assert_eq!(current_price(&cfg, Some(&end()), now), Money::zero());
        // The gate only looks at the event end.
        assert!(available(&cfg, Some(&end()), now));
    }

    #[test]
    fn disabled_configuration_still_quotes_a_price() {
        let cfg = config(false);
        let now = day(2, 15);
        assert!(!is_open(&cfg, Some(&end()), now));
        assert!(!available(&cfg, Some(&end()), now));
        assert_eq!(current_price(&cfg, Some(&end()), now), Money::from_cents(2000));
    }

    #[test]
    fn detached_configuration_fails_soft() {
        let cfg = config(true);
        let now = day(1, 15);
        let detached: Option<&DateTime<Utc>> = None;
        assert!(!within_time(&cfg, detached, now));
        assert!(!is_open(&cfg, detached, now));
        assert_eq!(current_price(&cfg, detached, now), Money::zero());
        assert!(available(&cfg, detached, now));
    }

    #[test]
    fn price_for_tier_by_name() {
        let cfg = config(true);
        assert_eq!(price_for_tier(&cfg, "early"), Some(Money::from_cents(1000)));
        assert_eq!(price_for_tier(&cfg, "regular"), Some(Money::from_cents(2000)));
        assert_eq!(price_for_tier(&cfg, "late"), Some(Money::from_cents(3000)));
        assert_eq!(price_for_tier(&cfg, "bogus"), None);
        assert_eq!(price_for_tier(&cfg, "Early"), None);
    }

    #[test]
    fn late_tier_is_empty_when_event_ends_before_late_date() {
        let cfg = config(true);
        let early_end = day(2, 20);
        assert!(!within_time(&cfg, Some(&early_end), day(3, 1) + Duration::hours(1)));
        assert_eq!(
            current_price(&cfg, Some(&early_end), day(2, 10)),
            Money::from_cents(2000)
        );
    }

    #[test]
    fn closed_after_event_end_even_when_late_date_is_later() {
        let cfg = config(true);
        let event_end = day(2, 20);
        let now = day(2, 25);

        assert!(!within_time(&cfg, Some(&event_end), now));
        assert!(!is_open(&cfg, Some(&event_end), now));
        assert!(!available(&cfg, Some(&event_end), now));
        assert_eq!(current_price(&cfg, Some(&event_end), now), Money::zero());

        // Event ending inside the early tier cuts off the regular tier entirely.
        let short_end = day(1, 20);
        assert!(!is_open(&cfg, Some(&short_end), day(2, 1)));
        assert_eq!(current_price(&cfg, Some(&short_end), day(1, 20)), Money::from_cents(1000));
    }

    #[test]
    fn non_monotonic_boundaries_are_rejected() {
        let mut bad = schedule();
        bad.regular_dt = day(3, 2);
        assert!(matches!(bad.validate(), Err(DomainError::Validation(_))));

        let mut equal = schedule();
        equal.regular_dt = equal.early_dt;
        assert!(equal.validate().is_ok());
    }

    fn arb_schedule() -> impl Strategy<Value = (PricingSchedule, DateTime<Utc>)> {
        (1i64..10_000, 1i64..10_000, 1i64..10_000, 1i64..10_000, 0u64..100_000, 0u64..100_000, 0u64..100_000)
            .prop_map(|(a, b, c, d, p1, p2, p3)| {
                let early_dt = day(1, 1) + Duration::minutes(a);
                let regular_dt = early_dt + Duration::minutes(b);
                let late_dt = regular_dt + Duration::minutes(c);
                let end = late_dt + Duration::minutes(d);
                (
                    PricingSchedule {
                        early_dt,
                        regular_dt,
                        late_dt,
                        early_price: Money::from_cents(p1),
                        regular_price: Money::from_cents(p2),
                        late_price: Money::from_cents(p3),
                    },
                    end,
                )
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: strictly between adjacent boundaries exactly one tier contains `now`.
        #[test]
        fn exactly_one_tier_between_boundaries(
            (schedule, end) in arb_schedule(),
            pick in 0usize..3,
            frac in 1u32..1000,
        ) {
            let bounds = [schedule.early_dt, schedule.regular_dt, schedule.late_dt, end];
            let (lo, hi) = (bounds[pick], bounds[pick + 1]);
            let span_ms = (hi - lo).num_milliseconds();
            let offset = (span_ms * i64::from(frac) / 1000).clamp(1, span_ms - 1);
            let now = lo + Duration::milliseconds(offset);

            let matching: Vec<_> = schedule.tiers(end).into_iter().filter(|t| t.contains(now)).collect();
            prop_assert_eq!(matching.len(), 1);
            prop_assert_eq!(matching[0].tier, PricingTier::ALL[pick]);
        }

        /// Property: on an inner boundary the later tier's price wins.
        #[test]
        fn later_tier_wins_on_boundary((schedule, end) in arb_schedule(), pick in 1usize..3) {
            let boundary = [schedule.early_dt, schedule.regular_dt, schedule.late_dt][pick];
            let cfg = RegistrationConfiguration::configured(
                RegistrationConfigurationId::generate(),
                schedule.clone(),
                0,
                true,
                Vec::new(),
                boundary,
            ).unwrap();

            prop_assert!(is_open(&cfg, Some(&end), boundary));
            prop_assert_eq!(
                current_price(&cfg, Some(&end), boundary),
                schedule.price_of(PricingTier::ALL[pick])
            );
        }

        /// Property: a disabled configuration is never open.
        #[test]
        fn disabled_is_never_open((schedule, end) in arb_schedule(), minutes in -10_000i64..50_000) {
            let cfg = RegistrationConfiguration::configured(
                RegistrationConfigurationId::generate(),
                schedule,
                0,
                false,
                Vec::new(),
                end,
            ).unwrap();
            let now = day(1, 1) + Duration::minutes(minutes);
            prop_assert!(!is_open(&cfg, Some(&end), now));
        }

        /// Property: nothing is open after the event ends.
        #[test]
        fn closed_after_event_end((schedule, end) in arb_schedule(), after in 1i64..100_000) {
            let cfg = RegistrationConfiguration::configured(
                RegistrationConfigurationId::generate(),
                schedule,
                0,
                true,
                Vec::new(),
                end,
            ).unwrap();
            let now = end + Duration::seconds(after);
            prop_assert!(!is_open(&cfg, Some(&end), now));
            prop_assert!(!available(&cfg, Some(&end), now));
        }
    }
}
