//! Aggregate statistics over the record list.

use crate::model::record::{ApplianceCounts, LivestockCounts, SurveyRecord, TransportCounts};

/// Totals shown on the dashboard and printed by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveySummary {
    pub records: usize,
    pub families: i64,
    pub male: i64,
    pub female: i64,
    pub others: i64,
    pub total_members: i64,
    pub with_location: usize,
    pub with_photo: usize,
    pub with_signature: usize,
    pub livestock: LivestockCounts,
    pub transport: TransportCounts,
    pub appliances: ApplianceCounts,
}

impl SurveySummary {
    pub fn from_records(records: &[SurveyRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            acc.records += 1;
            acc.families = acc.families.saturating_add(record.families_count);
            acc.male = acc.male.saturating_add(record.male);
            acc.female = acc.female.saturating_add(record.female);
            acc.others = acc.others.saturating_add(record.others);
            acc.total_members = acc.total_members.saturating_add(record.total);
            acc.with_location += usize::from(record.location.is_some());
            acc.with_photo += usize::from(record.photo.is_some());
            acc.with_signature += usize::from(record.signature.is_some());
            add_livestock(&mut acc.livestock, &record.livestock);
            add_transport(&mut acc.transport, &record.transport);
            add_appliances(&mut acc.appliances, &record.appliances);
            acc
        })
    }
}

fn add_livestock(total: &mut LivestockCounts, item: &LivestockCounts) {
    total.cows = total.cows.saturating_add(item.cows);
    total.buffaloes = total.buffaloes.saturating_add(item.buffaloes);
    total.goats = total.goats.saturating_add(item.goats);
    total.sheep = total.sheep.saturating_add(item.sheep);
    total.poultry = total.poultry.saturating_add(item.poultry);
    total.others = total.others.saturating_add(item.others);
}

fn add_transport(total: &mut TransportCounts, item: &TransportCounts) {
    total.bicycles = total.bicycles.saturating_add(item.bicycles);
    total.motorcycles = total.motorcycles.saturating_add(item.motorcycles);
    total.cars = total.cars.saturating_add(item.cars);
    total.rickshaws = total.rickshaws.saturating_add(item.rickshaws);
    total.tractors = total.tractors.saturating_add(item.tractors);
}

fn add_appliances(total: &mut ApplianceCounts, item: &ApplianceCounts) {
    total.televisions = total.televisions.saturating_add(item.televisions);
    total.refrigerators = total.refrigerators.saturating_add(item.refrigerators);
    total.air_conditioners = total.air_conditioners.saturating_add(item.air_conditioners);
    total.washing_machines = total.washing_machines.saturating_add(item.washing_machines);
    total.computers = total.computers.saturating_add(item.computers);
}

#[cfg(test)]
mod tests {
    use super::SurveySummary;
    use crate::model::record::{RecordId, SurveyRecord};

    #[test]
    fn sums_members_and_categories() {
        let mut first = SurveyRecord::new(RecordId::from("a"), 1);
        first.set_members(2, 1, 0);
        first.livestock.goats = 4;
        first.photo = Some("p".to_string());
        let mut second = SurveyRecord::new(RecordId::from("b"), 2);
        second.set_members(1, 3, 1);
        second.families_count = 2;
        second.livestock.goats = 1;
        second.transport.motorcycles = 1;

        let summary = SurveySummary::from_records(&[first, second]);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.families, 3);
        assert_eq!(summary.total_members, 8);
        assert_eq!(summary.female, 4);
        assert_eq!(summary.livestock.goats, 5);
        assert_eq!(summary.transport.motorcycles, 1);
        assert_eq!(summary.with_photo, 1);
        assert_eq!(summary.with_location, 0);
    }

    #[test]
    fn member_sums_saturate_instead_of_overflowing() {
        let mut first = SurveyRecord::new(RecordId::from("a"), 1);
        first.male = i64::MAX;
        first.total = i64::MAX;
        first.families_count = i64::MAX;
        let second = first.clone();

        let summary = SurveySummary::from_records(&[first, second]);
        assert_eq!(summary.male, i64::MAX);
        assert_eq!(summary.total_members, i64::MAX);
        assert_eq!(summary.families, i64::MAX);
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(SurveySummary::from_records(&[]), SurveySummary::default());
    }
}
