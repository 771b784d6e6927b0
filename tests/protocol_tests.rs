use std::sync::Arc;

use battleroom::protocol::{Message, RemoteError, Request, Response, PROTOCOL_VERSION};
use battleroom::skeleton::{dispatch, serve};
use battleroom::transport::in_memory::InMemoryTransport;
use battleroom::transport::tcp::{read_frame, write_frame, TcpTransport};
use battleroom::transport::{ConnectionClosed, Transport};
use battleroom::{
    error_kind, AttackOutcome, BoatClass, ErrorKind, FleetQuota, InMemoryRepository, Orientation,
    RoomApi, RoomId, RoomService, RoomSettings, Skeleton, Stub, UserId,
};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::net::TcpListener;
use tokio::time::Duration;

fn in_process() -> (Stub<InMemoryTransport>, tokio::task::JoinHandle<anyhow::Result<()>>) {
    let (server_end, client_end) = InMemoryTransport::pair();
    let service = Arc::new(RoomService::new(InMemoryRepository::new()));
    let server = tokio::spawn(async move {
        let mut skeleton = Skeleton::new(service, server_end);
        skeleton.run().await
    });
    (Stub::new(client_end), server)
}

async fn play_short_match<A: RoomApi>(api: &A) -> anyhow::Result<()> {
    let settings = RoomSettings::new("remote", 6)
        .with_quota(FleetQuota::uniform(0).with(BoatClass::PatrolBoat, 1));
    let room = api.create_room(UserId(1), settings).await?;
    let p1 = api.join_room(room, UserId(1), "one".into()).await?;
    let p2 = api.join_room(room, UserId(2), "two".into()).await?;
    assert!(
        api.place_boat(room, UserId(1), BoatClass::PatrolBoat, (0, 0), Orientation::Vertical)
            .await?
    );
    api.place_boat(room, UserId(2), BoatClass::PatrolBoat, (3, 3), Orientation::Horizontal)
        .await?;
    assert_eq!(api.start_match(room, UserId(2)).await?, p1);

    assert_eq!(
        api.attack(room, UserId(1), p2, (3, 3)).await?.outcome,
        AttackOutcome::Hit
    );
    let report = api.attack(room, UserId(1), p2, (3, 4)).await?;
    assert_eq!(report.winner, Some(p1));

    let board = api.board(room, UserId(2), None).await?;
    assert_eq!(board.cells[4][4], "X");
    assert_eq!(board.cells[4][5], "X");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stub_and_skeleton_in_memory() -> anyhow::Result<()> {
    let (stub, server) = in_process();
    play_short_match(&stub).await?;
    let rooms = stub.list_rooms().await?;
    assert_eq!(rooms.len(), 1);
    drop(stub);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_errors_keep_their_kind() -> anyhow::Result<()> {
    let (stub, _server) = in_process();
    let err = stub.room(RoomId(5)).await.unwrap_err();
    let remote = err.downcast_ref::<RemoteError>().unwrap();
    assert_eq!(remote.kind, ErrorKind::NotFound);
    assert_eq!(error_kind(&err), Some(ErrorKind::NotFound));

    let room = stub.create_room(UserId(1), RoomSettings::default()).await?;
    stub.join_room(room, UserId(1), "one".into()).await?;
    let err = stub
        .place_boat(room, UserId(1), BoatClass::Frigate, (9, 9), Orientation::Horizontal)
        .await
        .unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::Validation));

    // a failed call does not break the session
    assert_eq!(stub.room(room).await?.players.len(), 1);
    Ok(())
}

#[tokio::test]
async fn dispatch_maps_errors_to_responses() {
    let service = RoomService::new(InMemoryRepository::new());
    match dispatch(&service, Request::GetRoom { room: RoomId(1) }).await {
        Response::Error { kind, message } => {
            assert_eq!(kind, ErrorKind::NotFound);
            assert!(message.contains('1'));
        }
        other => panic!("expected error, got {:?}", other),
    }
    match dispatch(&service, Request::ListRooms).await {
        Response::Rooms(rooms) => assert!(rooms.is_empty()),
        other => panic!("expected rooms, got {:?}", other),
    }
}

#[tokio::test]
async fn skeleton_rejects_version_mismatch() {
    let (server_end, mut client_end) = InMemoryTransport::pair();
    let service = Arc::new(RoomService::new(InMemoryRepository::new()));
    let server = tokio::spawn(async move {
        let mut skeleton = Skeleton::new(service, server_end);
        skeleton.run().await
    });
    client_end
        .send(Message::Hello {
            version: PROTOCOL_VERSION + 1,
        })
        .await
        .unwrap();
    let result = server.await.unwrap();
    assert!(result.unwrap_err().to_string().contains("version"));
}

#[tokio::test]
async fn peer_hang_up_ends_the_session_cleanly() -> anyhow::Result<()> {
    let (server_end, mut client_end) = InMemoryTransport::pair();
    let service = Arc::new(RoomService::new(InMemoryRepository::new()));
    let server = tokio::spawn(async move {
        let mut skeleton = Skeleton::new(service, server_end);
        skeleton.run().await
    });
    client_end
        .send(Message::Hello {
            version: PROTOCOL_VERSION,
        })
        .await?;
    assert!(matches!(client_end.recv().await?, Message::Hello { .. }));
    drop(client_end);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn garbled_frame_aborts_the_session_with_an_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let service = Arc::new(RoomService::new(InMemoryRepository::new()));
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut skeleton = Skeleton::new(service, TcpTransport::new(socket));
        skeleton.run().await
    });

    let mut client = TcpStream::connect(addr).await?;
    let hello = Message::Hello {
        version: PROTOCOL_VERSION,
    };
    write_frame(&mut client, &hello, 1024).await?;
    assert!(matches!(read_frame(&mut client, 1024).await?, Message::Hello { .. }));
    // three bytes cannot hold a message tag
    client.write_all(&[0, 0, 0, 3, 1, 2, 3]).await?;
    client.flush().await?;

    let err = server.await?.unwrap_err();
    assert!(!err.is::<ConnectionClosed>());
    assert!(err.to_string().contains("Deserialization"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn closed_tcp_peer_reports_connection_closed() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        drop(socket);
        anyhow::Ok(())
    });
    let mut transport = TcpTransport::connect(addr).await?;
    server.await??;
    let err = transport.recv().await.unwrap_err();
    assert!(err.is::<ConnectionClosed>());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stub_and_skeleton_over_tcp() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let service = Arc::new(RoomService::new(InMemoryRepository::new()));
    let server = tokio::spawn(serve(listener, service, Duration::from_secs(5)));

    let stub = Stub::new(TcpTransport::connect(addr).await?);
    play_short_match(&stub).await?;

    // a second client sees the same rooms
    let other = Stub::new(TcpTransport::connect(addr).await?);
    assert_eq!(other.list_rooms().await?.len(), 1);

    server.abort();
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_frame_is_rejected() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    });

    let mut transport = TcpTransport::connect(addr).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"));
    server.await?;
    Ok(())
}

#[tokio::test]
async fn frames_respect_size_limit() {
    let msg = Message::Request {
        seq: 1,
        body: Request::ListRooms,
    };
    let mut buf = Vec::new();
    write_frame(&mut buf, &msg, 1024).await.unwrap();
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    assert_eq!(len, buf.len() - 4);

    let decoded = read_frame(&mut buf.as_slice(), 1024).await.unwrap();
    assert!(matches!(decoded, Message::Request { seq: 1, body: Request::ListRooms }));
    assert!(read_frame(&mut buf.as_slice(), 2).await.is_err());
    assert!(write_frame(&mut Vec::new(), &msg, 2).await.is_err());
}
