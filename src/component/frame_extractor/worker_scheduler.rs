use super::capture_job::FrameCaptureJob;
use super::error::{ErrorKind, ErrorRecord};
use super::services::MediaToolkit;
use super::types::ExtractionResult;
use crate::config::ExtractionConfig;
use anyhow::{Context, Result};
use log::{debug, error, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::ThreadPoolBuilder;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

#[derive(Debug, Clone)]
pub struct VideoJob {
    pub video_path: PathBuf,
    pub output_dir: PathBuf,
}

type JobQueue = Mutex<VecDeque<(usize, VideoJob)>>;

/// 固定大小的工作池
///
/// 同時處理的影片數不超過 `max_workers`，影片依佇列順序開始處理。
/// 每部影片使用由執行種子與佇列序號推導的亂數產生器，結果與執行緒排程無關。
pub struct WorkerScheduler<'a> {
    toolkit: &'a MediaToolkit,
    config: &'a ExtractionConfig,
    shutdown_signal: Arc<AtomicBool>,
    run_seed: u64,
}

impl<'a> WorkerScheduler<'a> {
    pub const fn new(
        toolkit: &'a MediaToolkit,
        config: &'a ExtractionConfig,
        shutdown_signal: Arc<AtomicBool>,
        run_seed: u64,
    ) -> Self {
        Self {
            toolkit,
            config,
            shutdown_signal,
            run_seed,
        }
    }

    /// 處理所有影片，回傳與輸入順序相同的結果
    ///
    /// `on_result` 在主執行緒上依完成順序呼叫，每部影片恰好一次。
    pub fn run_all(
        &self,
        jobs: Vec<VideoJob>,
        mut on_result: impl FnMut(&ExtractionResult),
    ) -> Result<Vec<ExtractionResult>> {
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let worker_count = self.config.max_workers.clamp(1, total);
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|i| format!("frame-worker-{i}"))
            .build()
            .context("無法建立工作執行緒池")?;
        debug!("工作池大小: {worker_count}，影片數: {total}");

        let queue: JobQueue = Mutex::new(jobs.iter().cloned().enumerate().collect());
        let (sender, receiver) = mpsc::channel::<(usize, ExtractionResult)>();
        let mut slots: Vec<Option<ExtractionResult>> = (0..total).map(|_| None).collect();

        thread::scope(|scope| {
            let queue = &queue;
            scope.spawn(move || {
                pool.scope(|pool_scope| {
                    for _ in 0..worker_count {
                        let sender = sender.clone();
                        pool_scope.spawn(move |_| self.drain(queue, &sender));
                    }
                });
            });

            for (seq, result) in receiver {
                on_result(&result);
                slots[seq] = Some(result);
            }
        });

        Ok(slots
            .into_iter()
            .zip(jobs)
            .map(|(slot, job)| {
                slot.unwrap_or_else(|| {
                    error!("影片沒有回報結果: {}", job.video_path.display());
                    let record = ErrorRecord::new(
                        ErrorKind::Panicked,
                        &job.video_path,
                        "工作執行緒未回報結果",
                    );
                    ExtractionResult::failed(&job.video_path, &job.output_dir, record)
                })
            })
            .collect())
    }

    fn drain(&self, queue: &JobQueue, sender: &Sender<(usize, ExtractionResult)>) {
        loop {
            let next = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some((seq, job)) = next else {
                break;
            };

            let result = if self.shutdown_signal.load(Ordering::SeqCst) {
                let record = ErrorRecord::new(
                    ErrorKind::Cancelled,
                    &job.video_path,
                    "收到中斷信號，影片未開始處理",
                );
                ExtractionResult::failed(&job.video_path, &job.output_dir, record)
            } else {
                self.execute(seq, &job)
            };

            if sender.send((seq, result)).is_err() {
                warn!("結果通道已關閉，停止工作執行緒");
                break;
            }
        }
    }

    fn execute(&self, seq: usize, job: &VideoJob) -> ExtractionResult {
        let mut rng = StdRng::seed_from_u64(self.run_seed.wrapping_add(seq as u64 + 1));
        let capture = FrameCaptureJob::new(self.toolkit, self.config, &self.shutdown_signal);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            capture.run(&job.video_path, &job.output_dir, &mut rng)
        }));

        outcome.unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            error!("處理影片時發生 panic {}: {message}", job.video_path.display());
            let record = ErrorRecord::new(ErrorKind::Panicked, &job.video_path, message);
            ExtractionResult::failed(&job.video_path, &job.output_dir, record)
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "未知的 panic".to_string())
}
