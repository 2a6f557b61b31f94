//! Merges one grabbed listing into the stored schedule of a channel.

use chrono::{DateTime, Utc};
use epg_protocol::IncomingProgram;
use log::{debug, error, info, warn};

use super::config::ConfigSnapshot;
use super::holes::{min_gap, HoleDetector, HoleSet};
use super::template::{RenderedProgram, TemplateRenderer};
use super::UpdateError;
use crate::database::{ChannelRecord, NewProgram, ProgramRecord, ProgramState};
use crate::store::EpgStore;

/// Result of one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Stale entries and entries overlapping already stored data.
    pub discarded: usize,
    /// Entries repeating the time slot of the entry before them.
    pub duplicates: usize,
    /// Whether the listing itself had gaps longer than five minutes.
    pub has_gaps: bool,
}

impl ImportSummary {
    pub fn total_changes(&self) -> usize {
        self.inserted + self.updated
    }
}

/// Admission of an incoming program relative to the stored schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// After the watermark.
    Accept,
    /// At or before the watermark, not yet started, inside a hole.
    FillsHole,
    /// At or before the watermark and already started.
    Stale,
    /// At or before the watermark and not inside a hole.
    Overlap,
}

pub struct ProgramReconciler<'a, S: EpgStore + ?Sized> {
    store: &'a S,
    config: &'a ConfigSnapshot,
    renderer: TemplateRenderer<'a>,
    grabber_name: &'a str,
}

impl<'a, S: EpgStore + ?Sized> ProgramReconciler<'a, S> {
    pub fn new(store: &'a S, config: &'a ConfigSnapshot, grabber_name: &'a str) -> Self {
        Self {
            store,
            config,
            renderer: TemplateRenderer::new(config),
            grabber_name,
        }
    }

    /// Purge ended programs, detect holes, then merge `programs`.
    pub fn run(
        &self,
        channel: &ChannelRecord,
        programs: &[IncomingProgram],
        now: DateTime<Utc>,
    ) -> Result<ImportSummary, UpdateError> {
        let purged = self.store.delete_old_programs(channel.id, now)?;
        if purged > 0 {
            debug!(
                "{}: removed {} ended programs of {}",
                self.grabber_name, purged, channel.display_name
            );
        }

        let holes = HoleDetector::detect(self.store, channel, self.config, now)?;
        let watermark = self.store.get_newest_program_start(channel.id)?;

        self.merge(channel, programs, &holes, watermark, now)
    }

    /// Merge `programs` in listing order and save the channel's grab state.
    ///
    /// `watermark` is the start of the newest stored program. Entries at or
    /// before it are only taken when they fill a hole.
    pub fn merge(
        &self,
        channel: &ChannelRecord,
        programs: &[IncomingProgram],
        holes: &HoleSet,
        watermark: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary, UpdateError> {
        let mut summary = ImportSummary::default();
        let mut last: Option<&IncomingProgram> = None;

        for program in programs {
            if !program.has_valid_range() {
                warn!(
                    "{}: {} skipping program with invalid range {} - {}",
                    self.grabber_name, channel.display_name, program.start_time, program.end_time
                );
                continue;
            }

            if let Some(prev) = last {
                if program.same_slot(prev) {
                    summary.duplicates += 1;
                    continue;
                }
                if program.start_time - prev.end_time > min_gap() {
                    summary.has_gaps = true;
                }
            }
            last = Some(program);

            match self.admission(program, holes, watermark, now) {
                Admission::Accept => {}
                Admission::FillsHole => debug!(
                    "{}: {} stuffed an epg hole {} - {}",
                    self.grabber_name, channel.display_name, program.start_time, program.end_time
                ),
                rejected => {
                    debug!(
                        "{}: {} discarding {} - {} ({:?})",
                        self.grabber_name,
                        channel.display_name,
                        program.start_time,
                        program.end_time,
                        rejected
                    );
                    summary.discarded += 1;
                    continue;
                }
            }

            let rendered = self.renderer.render(&program.texts);
            let category_id = self.store.resolve_category(&rendered.text.genre)?;

            match self.resolve_target(channel, program) {
                Some(mut existing) => {
                    merge_into(&mut existing, program, &rendered, category_id);
                    self.store.update_program(&existing)?;
                    summary.updated += 1;
                }
                None => {
                    let RenderedProgram {
                        title,
                        description,
                        text,
                    } = rendered;
                    let new_program = NewProgram {
                        channel_id: channel.id,
                        start_time: program.start_time,
                        end_time: program.end_time,
                        title,
                        description,
                        category_id,
                        star_rating: text.star_rating,
                        classification: text.classification,
                        parental_rating: text.parental_rating,
                        state: ProgramState::NONE,
                    };
                    self.store.insert_program(&new_program)?;
                    summary.inserted += 1;
                }
            }
        }

        self.store
            .save_channel_grab_state(channel.id, now, summary.has_gaps)
            .map_err(|source| UpdateError::SaveChannel {
                channel_id: channel.id,
                source,
            })?;

        info!(
            "{}: {} inserted {} updated {} discarded {} gaps={}",
            self.grabber_name,
            channel.display_name,
            summary.inserted,
            summary.updated,
            summary.discarded,
            summary.has_gaps
        );

        Ok(summary)
    }

    fn admission(
        &self,
        program: &IncomingProgram,
        holes: &HoleSet,
        watermark: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Admission {
        if self.config.always_replace {
            return Admission::Accept;
        }
        match watermark {
            Some(watermark) if program.start_time <= watermark => {
                if program.start_time < now {
                    Admission::Stale
                } else if !holes.fits_in_any_hole(program.start_time, program.end_time) {
                    Admission::Overlap
                } else {
                    Admission::FillsHole
                }
            }
            _ => Admission::Accept,
        }
    }

    /// The stored row to overwrite, if any. Only always-replace mode updates
    /// rows; every other accepted entry is new by construction.
    ///
    /// With several rows in the slot the oldest is kept and the others are
    /// deleted. Lookup and delete failures are logged and do not stop the pass.
    fn resolve_target(
        &self,
        channel: &ChannelRecord,
        program: &IncomingProgram,
    ) -> Option<ProgramRecord> {
        if !self.config.always_replace {
            return None;
        }

        let matches =
            match self
                .store
                .find_programs_exact(channel.id, program.start_time, program.end_time)
            {
                Ok(matches) => matches,
                Err(e) => {
                    error!(
                        "{}: failed to look up programs of {} at {}: {}",
                        self.grabber_name, channel.display_name, program.start_time, e
                    );
                    return None;
                }
            };

        let mut matches = matches.into_iter();
        let target = matches.next()?;
        for stale in matches {
            if let Err(e) = self.store.delete_program(stale.id) {
                error!(
                    "{}: failed to delete duplicate program {}: {}",
                    self.grabber_name, stale.id, e
                );
            }
        }
        Some(target)
    }
}

/// Overwrite a stored program with freshly grabbed data.
///
/// The description is kept when the title is unchanged and the stored
/// description is at least as long as the new one.
pub fn merge_into(
    existing: &mut ProgramRecord,
    program: &IncomingProgram,
    rendered: &RenderedProgram,
    category_id: Option<i64>,
) {
    existing.start_time = program.start_time;
    existing.end_time = program.end_time;
    existing.category_id = category_id;
    existing.star_rating = rendered.text.star_rating;
    existing.classification = rendered.text.classification.clone();
    existing.parental_rating = rendered.text.parental_rating;

    if existing.title != rendered.title
        || existing.description.chars().count() < rendered.description.chars().count()
    {
        existing.description = rendered.description.clone();
    }
    existing.title = rendered.title.clone();
    existing.state.clear_record_pending();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Database, DatabaseError, NewChannel, Result};
    use crate::store::{CategoryResolver, ChannelStore, ProgramStore};
    use crate::updater::holes::Hole;
    use crate::updater::template::ResolvedText;
    use chrono::{Duration, TimeZone};
    use epg_protocol::{LanguageText, TuningKey};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, hour, min, 0).unwrap()
    }

    fn incoming(start: DateTime<Utc>, end: DateTime<Utc>, title: &str) -> IncomingProgram {
        IncomingProgram::new(start, end).with_text(LanguageText::new("jpn", title, ""))
    }

    fn stored(channel_id: i64, start: DateTime<Utc>, end: DateTime<Utc>, title: &str) -> NewProgram {
        NewProgram {
            channel_id,
            start_time: start,
            end_time: end,
            title: title.to_string(),
            description: String::new(),
            category_id: None,
            star_rating: 0,
            classification: String::new(),
            parental_rating: -1,
            state: ProgramState::NONE,
        }
    }

    fn setup() -> (Database, ChannelRecord) {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_channel(&NewChannel::new("NHK")).unwrap();
        let channel = db.get_channel(id).unwrap().unwrap();
        (db, channel)
    }

    fn titles(db: &Database, channel_id: i64) -> Vec<String> {
        db.get_programs_by_channel(channel_id)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect()
    }

    /// Stored 09:00-10:00, 10:30-12:00, 12:00-12:30: watermark 12:00, hole 10:00-10:30.
    fn setup_with_hole() -> (Database, ChannelRecord) {
        let (db, channel) = setup();
        db.insert_program(&stored(channel.id, at(9, 0), at(10, 0), "Morning")).unwrap();
        db.insert_program(&stored(channel.id, at(10, 30), at(12, 0), "Midday")).unwrap();
        db.insert_program(&stored(channel.id, at(12, 0), at(12, 30), "Lunch")).unwrap();
        db.update_channel_grab_state(channel.id, at(0, 0), true).unwrap();
        let channel = db.get_channel(channel.id).unwrap().unwrap();
        (db, channel)
    }

    #[test]
    fn test_fresh_channel_inserts_all() {
        let (db, channel) = setup();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let programs = vec![
            incoming(at(10, 0), at(10, 30), "A"),
            incoming(at(10, 30), at(11, 0), "B"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();

        assert_eq!(summary.inserted, 2);
        assert!(!summary.has_gaps);
        assert_eq!(titles(&db, channel.id), vec!["A", "B"]);

        let saved = db.get_channel(channel.id).unwrap().unwrap();
        assert_eq!(saved.last_grab_time, Some(at(9, 0)));
        assert!(!saved.epg_has_gaps);
    }

    #[test]
    fn test_internal_gap_sets_has_gaps() {
        let (db, channel) = setup();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let programs = vec![
            incoming(at(10, 0), at(10, 30), "A"),
            incoming(at(11, 0), at(11, 30), "C"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();

        assert!(summary.has_gaps);
        assert!(db.get_channel(channel.id).unwrap().unwrap().epg_has_gaps);
    }

    #[test]
    fn test_five_minute_gap_tolerated() {
        let (db, channel) = setup();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let programs = vec![
            incoming(at(10, 0), at(10, 30), "A"),
            incoming(at(10, 35), at(11, 0), "B"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();
        assert!(!summary.has_gaps);
    }

    #[test]
    fn test_duplicate_slot_skipped() {
        let (db, channel) = setup();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let programs = vec![
            incoming(at(10, 0), at(10, 30), "A"),
            incoming(at(10, 0), at(10, 30), "A again"),
            incoming(at(10, 30), at(11, 0), "B"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();

        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(titles(&db, channel.id), vec!["A", "B"]);
    }

    #[test]
    fn test_hole_fill_accepted() {
        let (db, channel) = setup_with_hole();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let summary = reconciler
            .run(&channel, &[incoming(at(10, 5), at(10, 25), "Filler")], at(8, 0))
            .unwrap();

        assert_eq!(summary.inserted, 1);
        assert_eq!(
            titles(&db, channel.id),
            vec!["Morning", "Filler", "Midday", "Lunch"]
        );
    }

    #[test]
    fn test_admission_reports_hole_fill() {
        let config = ConfigSnapshot::default();
        let (db, _) = setup();
        let reconciler = ProgramReconciler::new(&db, &config, "test");
        let holes = HoleSet::new(vec![Hole {
            start: at(10, 0),
            end: at(10, 30),
        }]);
        let watermark = Some(at(12, 0));
        let admit = |start, end, now| {
            reconciler.admission(&incoming(start, end, "X"), &holes, watermark, now)
        };

        assert_eq!(admit(at(10, 5), at(10, 25), at(8, 0)), Admission::FillsHole);
        assert_eq!(admit(at(10, 5), at(10, 45), at(8, 0)), Admission::Overlap);
        assert_eq!(admit(at(12, 30), at(13, 0), at(8, 0)), Admission::Accept);
        assert_eq!(admit(at(10, 5), at(10, 25), at(10, 10)), Admission::Stale);
    }

    #[test]
    fn test_hole_overrun_discarded() {
        let (db, channel) = setup_with_hole();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let summary = reconciler
            .run(&channel, &[incoming(at(10, 5), at(10, 40), "Too long")], at(8, 0))
            .unwrap();

        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.discarded, 1);
        assert_eq!(titles(&db, channel.id), vec!["Morning", "Midday", "Lunch"]);
    }

    #[test]
    fn test_overlap_without_hole_discarded() {
        let (db, channel) = setup();
        db.insert_program(&stored(channel.id, at(10, 0), at(11, 0), "Stored 1")).unwrap();
        db.insert_program(&stored(channel.id, at(11, 0), at(12, 0), "Stored 2")).unwrap();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let programs = vec![
            incoming(at(10, 0), at(11, 0), "Overlap"),
            incoming(at(11, 0), at(12, 0), "At watermark"),
            incoming(at(12, 0), at(13, 0), "Beyond"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();

        assert_eq!(summary.discarded, 2);
        assert_eq!(summary.inserted, 1);
        assert_eq!(titles(&db, channel.id), vec!["Stored 1", "Stored 2", "Beyond"]);
    }

    #[test]
    fn test_stale_entry_discarded_even_inside_hole() {
        let (db, channel) = setup_with_hole();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        // Before the watermark and already running.
        let summary = reconciler
            .run(&channel, &[incoming(at(10, 5), at(10, 25), "Late")], at(10, 10))
            .unwrap();

        assert_eq!(summary.discarded, 1);
        assert_eq!(summary.inserted, 0);
    }

    #[test]
    fn test_discarded_entry_advances_gap_tracking() {
        let (db, channel) = setup_with_hole();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        // The discarded entries close the span between "Filler" and "Next".
        let programs = vec![
            incoming(at(10, 0), at(10, 30), "Filler"),
            incoming(at(10, 30), at(12, 0), "Midday again"),
            incoming(at(12, 0), at(12, 30), "Lunch again"),
            incoming(at(12, 30), at(13, 0), "Next"),
        ];
        let summary = reconciler.run(&channel, &programs, at(8, 0)).unwrap();

        assert_eq!(summary.discarded, 2);
        assert_eq!(summary.inserted, 2);
        assert!(!summary.has_gaps);
    }

    #[test]
    fn test_invalid_range_skipped() {
        let (db, channel) = setup();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let programs = vec![
            incoming(at(10, 0), at(10, 30), "A"),
            incoming(at(10, 30), at(10, 30), "Empty"),
            incoming(at(10, 30), at(11, 0), "B"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();

        assert_eq!(summary.inserted, 2);
        assert!(!summary.has_gaps);
        assert_eq!(titles(&db, channel.id), vec!["A", "B"]);
    }

    #[test]
    fn test_purges_ended_programs() {
        let (db, channel) = setup();
        db.insert_program(&stored(channel.id, at(6, 0), at(7, 0), "Yesterday")).unwrap();
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        reconciler
            .run(&channel, &[incoming(at(10, 0), at(11, 0), "New")], at(9, 0))
            .unwrap();
        assert_eq!(titles(&db, channel.id), vec!["New"]);
    }

    #[test]
    fn test_insert_renders_and_resolves_category() {
        let (db, channel) = setup();
        let config = ConfigSnapshot {
            title_template: "%TITLE% %STARRATING_STR%".to_string(),
            description_template: "%GENRE%%NEWLINE%%DESCRIPTION%".to_string(),
            ..ConfigSnapshot::default()
        };
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let program = IncomingProgram::new(at(10, 0), at(11, 0)).with_text(
            LanguageText::new("jpn", "Drama", "Episode 1")
                .with_genre("Drama")
                .with_star_rating(3)
                .with_classification("G")
                .with_parental_rating(6),
        );
        reconciler.run(&channel, &[program], at(9, 0)).unwrap();

        let record = db.get_programs_by_channel(channel.id).unwrap().remove(0);
        assert_eq!(record.title, "Drama **");
        assert_eq!(record.description, "Drama\nEpisode 1");
        assert_eq!(record.star_rating, 3);
        assert_eq!(record.classification, "G");
        assert_eq!(record.parental_rating, 6);
        assert!(record.state.is_empty());

        let categories = db.get_categories().unwrap();
        assert_eq!(record.category_id, Some(categories[0].0));
        assert_eq!(categories[0].1, "Drama");
    }

    #[test]
    fn test_always_replace_updates_oldest_and_deletes_rest() {
        let (db, channel) = setup();
        let first = db
            .insert_program(&stored(channel.id, at(10, 0), at(11, 0), "Old 1"))
            .unwrap();
        db.insert_program(&stored(channel.id, at(10, 0), at(11, 0), "Old 2")).unwrap();
        db.insert_program(&stored(channel.id, at(10, 0), at(11, 0), "Old 3")).unwrap();

        let config = ConfigSnapshot {
            always_replace: true,
            ..ConfigSnapshot::default()
        };
        let reconciler = ProgramReconciler::new(&db, &config, "test");
        let summary = reconciler
            .run(&channel, &[incoming(at(10, 0), at(11, 0), "Fresh")], at(9, 0))
            .unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.inserted, 0);
        let records = db.get_programs_by_channel(channel.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, first);
        assert_eq!(records[0].title, "Fresh");
    }

    #[test]
    fn test_always_replace_accepts_past_and_overlapping() {
        let (db, channel) = setup();
        db.insert_program(&stored(channel.id, at(10, 0), at(12, 0), "Stored")).unwrap();
        let config = ConfigSnapshot {
            always_replace: true,
            ..ConfigSnapshot::default()
        };
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        let summary = reconciler
            .run(&channel, &[incoming(at(10, 0), at(11, 0), "Overlap")], at(10, 30))
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.discarded, 0);
    }

    /// Delegates to a database but fails every delete.
    struct FailingDeletes<'a>(&'a Database);

    impl ChannelStore for FailingDeletes<'_> {
        fn find_channel_by_tuning_key(&self, key: &TuningKey) -> Result<Option<ChannelRecord>> {
            self.0.find_channel_by_tuning_key(key)
        }

        fn save_channel_grab_state(
            &self,
            channel_id: i64,
            last_grab_time: DateTime<Utc>,
            has_gaps: bool,
        ) -> Result<()> {
            self.0.save_channel_grab_state(channel_id, last_grab_time, has_gaps)
        }
    }

    impl ProgramStore for FailingDeletes<'_> {
        fn delete_old_programs(&self, channel_id: i64, now: DateTime<Utc>) -> Result<usize> {
            self.0.delete_old_programs(channel_id, now)
        }

        fn get_programs(&self, channel_id: i64, since: DateTime<Utc>) -> Result<Vec<ProgramRecord>> {
            self.0.get_programs(channel_id, since)
        }

        fn get_newest_program_start(&self, channel_id: i64) -> Result<Option<DateTime<Utc>>> {
            self.0.get_newest_program_start(channel_id)
        }

        fn find_programs_exact(
            &self,
            channel_id: i64,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<ProgramRecord>> {
            self.0.find_programs_exact(channel_id, start, end)
        }

        fn insert_program(&self, program: &NewProgram) -> Result<i64> {
            ProgramStore::insert_program(self.0, program)
        }

        fn update_program(&self, program: &ProgramRecord) -> Result<()> {
            ProgramStore::update_program(self.0, program)
        }

        fn delete_program(&self, program_id: i64) -> Result<()> {
            Err(DatabaseError::ProgramNotFound(program_id))
        }
    }

    impl CategoryResolver for FailingDeletes<'_> {
        fn resolve_category(&self, genre: &str) -> Result<Option<i64>> {
            self.0.resolve_category(genre)
        }
    }

    #[test]
    fn test_failed_duplicate_delete_does_not_abort() {
        let (db, channel) = setup();
        db.insert_program(&stored(channel.id, at(10, 0), at(11, 0), "Old 1")).unwrap();
        db.insert_program(&stored(channel.id, at(10, 0), at(11, 0), "Old 2")).unwrap();

        let config = ConfigSnapshot {
            always_replace: true,
            ..ConfigSnapshot::default()
        };
        let store = FailingDeletes(&db);
        let reconciler = ProgramReconciler::new(&store, &config, "test");
        let programs = vec![
            incoming(at(10, 0), at(11, 0), "Fresh"),
            incoming(at(11, 0), at(12, 0), "Next"),
        ];
        let summary = reconciler.run(&channel, &programs, at(9, 0)).unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.inserted, 1);
        assert_eq!(titles(&db, channel.id), vec!["Fresh", "Old 2", "Next"]);
    }

    #[test]
    fn test_missing_channel_fails_save() {
        let (db, mut channel) = setup();
        channel.id += 100;
        let config = ConfigSnapshot::default();
        let reconciler = ProgramReconciler::new(&db, &config, "test");

        // Foreign key rejects the insert before the save is reached.
        assert!(matches!(
            reconciler.run(&channel, &[incoming(at(10, 0), at(11, 0), "A")], at(9, 0)),
            Err(UpdateError::Store(_))
        ));
        assert!(matches!(
            reconciler.run(&channel, &[], at(9, 0)),
            Err(UpdateError::SaveChannel { .. })
        ));
    }

    fn record(title: &str, description: &str, state: ProgramState) -> ProgramRecord {
        ProgramRecord {
            id: 1,
            channel_id: 1,
            start_time: at(10, 0),
            end_time: at(11, 0),
            title: title.to_string(),
            description: description.to_string(),
            category_id: None,
            star_rating: 0,
            classification: String::new(),
            parental_rating: -1,
            state,
        }
    }

    fn rendered(title: &str, description: &str) -> RenderedProgram {
        RenderedProgram {
            title: title.to_string(),
            description: description.to_string(),
            text: ResolvedText {
                star_rating: 2,
                classification: "PG".to_string(),
                parental_rating: 12,
                ..ResolvedText::default()
            },
        }
    }

    #[test]
    fn test_merge_keeps_longer_description() {
        let program = IncomingProgram::new(at(10, 0), at(11, 5));
        let mut existing = record("News", "A long description", ProgramState::NONE);
        merge_into(&mut existing, &program, &rendered("News", "Short"), Some(4));

        assert_eq!(existing.description, "A long description");
        assert_eq!(existing.end_time, at(11, 5));
        assert_eq!(existing.category_id, Some(4));
        assert_eq!(existing.star_rating, 2);
        assert_eq!(existing.classification, "PG");
        assert_eq!(existing.parental_rating, 12);
    }

    #[test]
    fn test_merge_overwrites_description() {
        let program = IncomingProgram::new(at(10, 0), at(11, 0));

        // Longer description with the same title.
        let mut existing = record("News", "Short", ProgramState::NONE);
        merge_into(&mut existing, &program, &rendered("News", "Much longer"), None);
        assert_eq!(existing.description, "Much longer");

        // Different title replaces even a longer description.
        let mut existing = record("News", "A long description", ProgramState::NONE);
        merge_into(&mut existing, &program, &rendered("Weather", "Sun"), None);
        assert_eq!(existing.title, "Weather");
        assert_eq!(existing.description, "Sun");
    }

    #[test]
    fn test_merge_clears_pending_state() {
        let program = IncomingProgram::new(at(10, 0), at(11, 0));
        let mut existing = record(
            "News",
            "",
            ProgramState::RECORD_ONCE | ProgramState::CONFLICT | ProgramState::RECORD_ONCE_PENDING,
        );
        merge_into(&mut existing, &program, &rendered("News", ""), None);
        assert_eq!(existing.state, ProgramState::RECORD_ONCE);
    }

    #[test]
    fn test_summary_total_changes() {
        let summary = ImportSummary {
            inserted: 2,
            updated: 3,
            discarded: 1,
            ..ImportSummary::default()
        };
        assert_eq!(summary.total_changes(), 5);
        assert_eq!(Duration::seconds(300), min_gap());
    }
}
