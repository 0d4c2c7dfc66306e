//! Decides which gift notifications trigger a draw.
//!
//! Combo gifts are reported once per increment while the streak builds and
//! once more, with `repeat_end` set, when it closes. Only that closing
//! notification is admitted, so one burst yields one draw. Other gift types
//! are complete on arrival and always admitted.

use giftdraw_types::GiftNotification;

/// A gift that passed admission, with the value of the whole burst.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmittedGift {
    pub gift: GiftNotification,
    pub total_value: u64,
}

pub fn is_admitted(gift: &GiftNotification) -> bool {
    !gift.is_combo() || gift.repeat_end
}

/// Diamonds per gift times the number of gifts in the burst.
pub fn total_value(gift: &GiftNotification) -> u64 {
    gift.diamond_count.saturating_mul(u64::from(gift.repeat_count))
}

pub fn admit(gift: GiftNotification) -> Option<AdmittedGift> {
    if !is_admitted(&gift) {
        return None;
    }
    let total_value = total_value(&gift);
    Some(AdmittedGift { gift, total_value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftdraw_types::COMBO_GIFT_TYPE;

    fn gift(gift_type: i64, repeat_count: u32, repeat_end: bool) -> GiftNotification {
        GiftNotification {
            gift_id: 5655,
            repeat_count,
            repeat_end,
            user_id: "42".to_string(),
            nickname: "viewer".to_string(),
            gift_type,
            diamond_count: 10,
        }
    }

    #[test]
    fn test_building_combo_is_rejected() {
        assert!(admit(gift(COMBO_GIFT_TYPE, 1, false)).is_none());
        assert!(admit(gift(COMBO_GIFT_TYPE, 7, false)).is_none());
    }

    #[test]
    fn test_combo_streak_admitted_once() {
        let streak = (1..=5).map(|count| gift(COMBO_GIFT_TYPE, count, count == 5));
        let admitted: Vec<_> = streak.filter_map(admit).collect();
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].gift.repeat_count, 5);
        assert_eq!(admitted[0].total_value, 50);
    }

    #[test]
    fn test_non_combo_always_admitted() {
        for repeat_end in [false, true] {
            let admitted = admit(gift(2, 2, repeat_end)).unwrap();
            assert_eq!(admitted.total_value, 20);
        }
        assert!(admit(gift(0, 1, false)).is_some());
    }

    #[test]
    fn test_total_value_saturates() {
        let mut huge = gift(2, u32::MAX, true);
        huge.diamond_count = u64::MAX;
        assert_eq!(total_value(&huge), u64::MAX);
    }
}
