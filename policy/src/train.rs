use std::{
    convert::Infallible,
    error::Error,
    fmt::Display,
    fs::create_dir_all,
    panic::resume_unwind,
    path::Path,
    thread,
    time::Instant,
};

use log::info;
use tictactoe::{GameResult, PlayError, Role, Rules};

use crate::{
    config::{PROGRESS_STEPS, SAVE_INTERVAL},
    play_game,
    Learner,
    PolicyTable,
    TableError,
    Tally,
};

/// Two learners training against each other.
pub struct Trainer {
    pub rules: Rules,
    pub attacker: Learner,
    pub defender: Learner,
}

impl Trainer {
    pub fn new(rules: Rules) -> Self {
        Trainer {
            rules,
            attacker: Learner::new(PolicyTable::new()),
            defender: Learner::new(PolicyTable::new()),
        }
    }

    /// Continue from the tables in `dir`. Missing tables start out empty.
    pub fn load(dir: impl AsRef<Path>, rules: Rules) -> Self {
        let dir = dir.as_ref();
        Trainer {
            rules,
            attacker: Learner::new(PolicyTable::load_or_default(
                dir.join(PolicyTable::file_name(rules, Role::Attacker)),
            )),
            defender: Learner::new(PolicyTable::load_or_default(
                dir.join(PolicyTable::file_name(rules, Role::Defender)),
            )),
        }
    }

    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.attacker = self.attacker.seeded(seed);
        self.defender = self.defender.seeded(seed.wrapping_add(1));
        self
    }

    /// Set the exploration rate of both learners, `None` turns exploration off.
    pub fn set_exploration(&mut self, rate: Option<f64>) {
        for learner in [&mut self.attacker, &mut self.defender] {
            match rate {
                Some(rate) => {
                    learner.explore = true;
                    learner.exploration_rate = rate;
                }
                None => learner.explore = false,
            }
        }
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), TrainError> {
        let dir = dir.as_ref();
        create_dir_all(dir).map_err(TableError::from)?;
        self.attacker
            .save(dir.join(PolicyTable::file_name(self.rules, Role::Attacker)))?;
        self.defender
            .save(dir.join(PolicyTable::file_name(self.rules, Role::Defender)))?;
        info!(
            "saved {} attacker and {} defender states to {}",
            self.attacker.table().len(),
            self.defender.table().len(),
            dir.display()
        );
        Ok(())
    }

    pub fn play(&mut self) -> Result<GameResult, PlayError> {
        play_game(self.rules, &mut self.attacker, &mut self.defender)
    }

    /// Play `count` games, logging progress along the way.
    pub fn run(&mut self, count: usize) -> Result<Tally, PlayError> {
        let step = (count / PROGRESS_STEPS).max(1);
        let start = Instant::now();
        let mut tally = Tally::default();
        for i in 1..=count {
            tally.update(self.play()?);
            if i % step == 0 {
                let elapsed = start.elapsed();
                let remaining = elapsed.mul_f64((count - i) as f64 / i as f64);
                info!(
                    "{}% ({i}/{count}) done, about {}s left",
                    i * 100 / count,
                    remaining.as_secs()
                );
            }
        }
        info!("{tally} in {:.1}s", start.elapsed().as_secs_f64());
        Ok(tally)
    }

    /// Split `count` games over `threads` workers that share the tables.
    pub fn run_parallel(&mut self, count: usize, threads: usize) -> Result<Tally, PlayError> {
        let threads = threads.clamp(1, count.max(1));
        if threads == 1 {
            return self.run(count);
        }

        let start = Instant::now();
        let workers: Vec<_> = (0..threads)
            .map(|i| {
                let games = count / threads + usize::from(i < count % threads);
                let worker = Trainer {
                    rules: self.rules,
                    attacker: self.attacker.fork(),
                    defender: self.defender.fork(),
                };
                (worker, games)
            })
            .collect();

        let results = thread::scope(|s| {
            let handles: Vec<_> = workers
                .into_iter()
                .map(|(mut worker, games)| {
                    s.spawn(move || -> Result<Tally, PlayError> {
                        let mut tally = Tally::default();
                        for _ in 0..games {
                            tally.update(worker.play()?);
                        }
                        Ok(tally)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| resume_unwind(panic)))
                .collect::<Vec<Result<Tally, PlayError>>>()
        });

        let mut tally = Tally::default();
        for result in results {
            tally.merge(result?);
        }
        info!(
            "{tally} on {threads} threads in {:.1}s",
            start.elapsed().as_secs_f64()
        );
        Ok(tally)
    }

    /// Train until the process is stopped, saving to `dir` every
    /// `SAVE_INTERVAL` games.
    pub fn run_forever(&mut self, dir: impl AsRef<Path>) -> Result<Infallible, TrainError> {
        let dir = dir.as_ref();
        let mut games = 0;
        loop {
            let start = Instant::now();
            let mut tally = Tally::default();
            for _ in 0..SAVE_INTERVAL {
                tally.update(self.play()?);
            }
            games += SAVE_INTERVAL;
            self.save(dir)?;
            info!(
                "{games} games total, last {SAVE_INTERVAL} took {:.2}s: {tally}",
                start.elapsed().as_secs_f64()
            );
        }
    }
}

#[derive(Debug)]
pub enum TrainError {
    Play(PlayError),
    Table(TableError),
}

impl Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainError::Play(err) => write!(f, "illegal move during training: {err}"),
            TrainError::Table(err) => write!(f, "could not save policy: {err}"),
        }
    }
}

impl Error for TrainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainError::Play(err) => Some(err),
            TrainError::Table(err) => Some(err),
        }
    }
}

impl From<PlayError> for TrainError {
    fn from(e: PlayError) -> Self {
        TrainError::Play(e)
    }
}

impl From<TableError> for TrainError {
    fn from(e: TableError) -> Self {
        TrainError::Table(e)
    }
}
