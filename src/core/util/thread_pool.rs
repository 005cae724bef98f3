//! A fixed-size worker pool with a bounded job queue, grounded on the
//! reference implementation's `core::util::thread_pool::ThreadPool`
//! (originally used to parallelize file-formatting jobs; reused here per
//! spec.md §5 to parallelize the outer pattern/binding evaluation loop,
//! since each job is an independent pure function and the aggregator that
//! collects results is commutative).

use std::collections::LinkedList;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread;

pub struct ThreadPool<Payload: 'static + Send> {
    queue_tx: SyncSender<Signal<Payload>>,
    term_rx: Receiver<()>,
}

impl<Payload: 'static + Send> ThreadPool<Payload> {
    pub fn spawn<JobRunner>(size: usize, queue_size: usize, job_runner: JobRunner) -> ThreadPool<Payload>
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let (queue_tx, queue_rx) = mpsc::sync_channel(queue_size);
        let (term_tx, term_rx) = mpsc::channel();

        WorkerMux::spawn(size, job_runner, queue_rx, term_tx);

        ThreadPool { queue_tx, term_rx }
    }

    pub fn enqueue(&self, payload: Payload) -> Result<(), mpsc::SendError<Signal<Payload>>> {
        self.queue_tx.send(Signal::Job(payload))
    }

    pub fn terminate_and_join(&self) {
        let _ = self.queue_tx.send(Signal::Term);
        let _ = self.term_rx.recv();
    }
}

struct WorkerMux {}

impl WorkerMux {
    fn spawn<JobRunner, Payload: 'static + Send>(
        size: usize,
        job_runner: JobRunner,
        queue_rx: Receiver<Signal<Payload>>,
        term_tx: Sender<()>,
    ) -> WorkerMux
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let job_runner_arc: Arc<JobRunner> = Arc::new(job_runner);

        let (mux_tx, mux_rx) = mpsc::channel();

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::spawn(id, mux_tx.clone(), job_runner_arc.clone()));
        }

        thread::spawn(move || {
            let mut idle_workers: LinkedList<WorkerId> = LinkedList::new();

            loop {
                while idle_workers.is_empty() {
                    let report = WorkerMux::join_worker_report(&mux_rx);
                    match report.status {
                        WorkerStatus::Idle => idle_workers.push_back(report.id),
                        WorkerStatus::Term => {}
                    }
                }

                match WorkerMux::join_job_queue(&queue_rx) {
                    Signal::Term => break,
                    Signal::Job(payload) => {
                        let worker_id = idle_workers.pop_back().unwrap();
                        workers[worker_id].run_job(payload);
                    }
                }
            }

            for worker in &workers {
                worker.terminate();
            }

            let mut terminated_workers = 0;
            while terminated_workers < size {
                match WorkerMux::join_worker_report(&mux_rx).status {
                    WorkerStatus::Idle => {}
                    WorkerStatus::Term => terminated_workers += 1,
                }
            }

            let _ = term_tx.send(());
        });

        WorkerMux {}
    }

    fn join_worker_report(mux_rx: &Receiver<WorkerReport>) -> WorkerReport {
        match mux_rx.recv() {
            Err(err) => panic!("worker rx error on thread pool mux: {}", err),
            Ok(report) => report,
        }
    }

    fn join_job_queue<Payload: 'static + Send>(queue_rx: &Receiver<Signal<Payload>>) -> Signal<Payload> {
        match queue_rx.recv() {
            Err(err) => panic!("job queue rx error on thread pool mux: {}", err),
            Ok(sig) => sig,
        }
    }
}

struct Worker<Payload: 'static + Send> {
    tx: Sender<Signal<Payload>>,
}

impl<Payload: 'static + Send> Worker<Payload> {
    fn spawn<JobRunner>(id: WorkerId, mux_tx: Sender<WorkerReport>, job_runner: Arc<JobRunner>) -> Worker<Payload>
    where
        JobRunner: Fn(Payload) + 'static + Send + Sync,
    {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let _ = mux_tx.send(WorkerReport { id, status: WorkerStatus::Idle });

                match Worker::join_job(&rx, id) {
                    Signal::Term => break,
                    Signal::Job(payload) => job_runner(payload),
                }
            }

            let _ = mux_tx.send(WorkerReport { id, status: WorkerStatus::Term });
        });

        Worker { tx }
    }

    fn run_job(&self, payload: Payload) {
        let _ = self.tx.send(Signal::Job(payload));
    }

    fn terminate(&self) {
        let _ = self.tx.send(Signal::Term);
    }

    fn join_job(rx: &Receiver<Signal<Payload>>, id: WorkerId) -> Signal<Payload> {
        match rx.recv() {
            Err(err) => panic!("mux rx error on worker thread {}: {}", id, err),
            Ok(sig) => sig,
        }
    }
}

pub enum Signal<Payload: 'static + Send> {
    Term,
    Job(Payload),
}

struct WorkerReport {
    id: WorkerId,
    status: WorkerStatus,
}

type WorkerId = usize;

enum WorkerStatus {
    Term,
    Idle,
}
