#![allow(dead_code, unreachable_code)]
use trellis_service::{TrellisService, IngestRequest};

fn assert_send<T: Send>(_t: T) {}

fn check(svc: &TrellisService, req: IngestRequest) {
    if true { return; }
    let fut = svc.ingest(req);
    assert_send(fut);
}
