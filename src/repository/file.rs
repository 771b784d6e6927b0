use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::RoomId;
use crate::repository::RoomRepository;
use crate::room::Room;

const PREFIX: &str = "room-";
const EXTENSION: &str = "bin";

/// One bincode file per room under a data directory.
pub struct FileRepository {
    dir: PathBuf,
    last_id: AtomicU64,
}

fn parse_id(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != EXTENSION {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(PREFIX)?
        .parse()
        .ok()
}

impl FileRepository {
    /// Open `dir`, creating it if needed, and continue numbering after the
    /// highest stored room.
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        let mut last = 0;
        for path in Self::room_files(&dir).await? {
            if let Some(id) = parse_id(&path) {
                last = last.max(id);
            }
        }
        log::debug!("opened room store at {} (last id {})", dir.display(), last);
        Ok(Self {
            dir,
            last_id: AtomicU64::new(last),
        })
    }

    fn path_for(&self, id: RoomId) -> PathBuf {
        self.dir.join(format!("{}{}.{}", PREFIX, id, EXTENSION))
    }

    async fn room_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if parse_id(&path).is_some() {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    async fn read_room(path: &Path) -> anyhow::Result<Room> {
        let bytes = tokio::fs::read(path).await?;
        bincode::deserialize(&bytes)
            .map_err(|e| anyhow::anyhow!("corrupt room file {}: {}", path.display(), e))
    }
}

#[async_trait::async_trait]
impl RoomRepository for FileRepository {
    async fn next_id(&self) -> anyhow::Result<RoomId> {
        Ok(RoomId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn load(&self, id: RoomId) -> anyhow::Result<Option<Room>> {
        let path = self.path_for(id);
        match tokio::fs::try_exists(&path).await? {
            true => Ok(Some(Self::read_room(&path).await?)),
            false => Ok(None),
        }
    }

    async fn save(&self, room: &Room) -> anyhow::Result<()> {
        let bytes =
            bincode::serialize(room).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
        let path = self.path_for(room.id());
        // write-then-rename so readers never see a partial file
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<Room>> {
        let mut rooms = Vec::new();
        for path in Self::room_files(&self.dir).await? {
            rooms.push(Self::read_room(&path).await?);
        }
        rooms.sort_by_key(|r| r.id());
        Ok(rooms)
    }

    async fn remove(&self, id: RoomId) -> anyhow::Result<bool> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
