//! End-to-end waiting scenarios against real TCP listeners.

use std::time::{Duration, Instant};

use portwatch_core::{
    check_port, wait_until_free, wait_until_used, Error, PortState, ProbeTarget, WaitOptions,
};
use tokio::net::TcpListener;
use tokio::time::sleep;

/// Bind then drop a loopback listener to find a port with nothing on it.
async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_resolves_once_listener_appears() {
    // Nothing listens on 44204 at first; a listener shows up two seconds in,
    // well inside the four second deadline.
    let options = WaitOptions::until_used(44204)
        .with_retry_interval(Duration::from_millis(500))
        .with_timeout(Duration::from_millis(4000));

    let binder = tokio::spawn(async {
        sleep(Duration::from_secs(2)).await;
        TcpListener::bind("127.0.0.1:44204").await.unwrap()
    });

    let started = Instant::now();
    wait_until_used(options).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(4000));

    drop(binder.await.unwrap());
}

#[tokio::test]
async fn test_times_out_when_listener_never_appears() {
    let options = WaitOptions::until_used(44205)
        .with_retry_interval(Duration::from_millis(500))
        .with_timeout(Duration::from_millis(2000));

    let started = Instant::now();
    let err = wait_until_used(options).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::Timeout));
    assert_eq!(err.to_string(), "timeout");
    assert!(elapsed >= Duration::from_millis(1900), "gave up early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(3500), "gave up late: {elapsed:?}");
}

#[tokio::test]
async fn test_resolves_once_listener_goes_away() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let closer = tokio::spawn(async move {
        sleep(Duration::from_millis(400)).await;
        drop(listener);
    });

    let options = WaitOptions::until_free(port)
        .with_retry_interval(Duration::from_millis(50))
        .with_timeout(Duration::from_secs(5));
    wait_until_free(options).await.unwrap();

    closer.await.unwrap();
}

#[tokio::test]
async fn test_times_out_while_listener_stays_bound() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let options = WaitOptions::until_free(port)
        .with_retry_interval(Duration::from_millis(100))
        .with_timeout(Duration::from_millis(500));
    let err = wait_until_free(options).await.unwrap_err();
    assert!(matches!(err, Error::Timeout));

    drop(listener);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let listener_a = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port_a = listener_a.local_addr().unwrap().port();
    let port_b = free_port().await;

    // One session has its listener up front, the other gets it later;
    // neither disturbs the other's timers.
    let binder = tokio::spawn(async move {
        sleep(Duration::from_millis(300)).await;
        TcpListener::bind(("127.0.0.1", port_b)).await.unwrap()
    });

    let quick = WaitOptions::until_used(port_a)
        .with_retry_interval(Duration::from_millis(50))
        .with_timeout(Duration::from_secs(5));
    let slow = WaitOptions::until_used(port_b)
        .with_retry_interval(Duration::from_millis(50))
        .with_timeout(Duration::from_secs(5));

    let (first, second) = tokio::join!(wait_until_used(quick), wait_until_used(slow));
    first.unwrap();
    second.unwrap();

    drop(binder.await.unwrap());
    drop(listener_a);
}

#[tokio::test]
async fn test_check_state_tracks_listener_lifecycle() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    assert_eq!(check_port(port).await.unwrap(), PortState::InUse);
    drop(listener);
    assert_eq!(check_port(port).await.unwrap(), PortState::Free);
}

#[tokio::test]
async fn test_port_text_is_rejected_before_probing() {
    let err = "hello".parse::<ProbeTarget>().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("invalid port"));
    assert!(msg.contains("hello"));
}
