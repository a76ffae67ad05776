use crate::error::AppResult;
use crate::models::{Reservation, ReserveRequest};
use crate::services::history_service::require_number;
use crate::store::{CollectionKey, Repository};

#[derive(Clone)]
pub struct ReservationService {
    repo: Repository,
}

impl ReservationService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AppResult<Vec<Reservation>> {
        let (items, _) = self.repo.load(&CollectionKey::Names).await?;
        Ok(items)
    }

    /// 预约或释放号码: 先移除该号码的旧预约, 昵称非空时再写入新预约
    pub async fn reserve(&self, req: ReserveRequest) -> AppResult<()> {
        let number = require_number(req.number)?;
        // 只用 trim 判断是否为空, 保存原始昵称
        let nickname = req.nickname.filter(|n| !n.trim().is_empty());

        self.repo
            .update(&CollectionKey::Names, |items: &mut Vec<Reservation>| {
                items.retain(|r| r.number != number);
                if let Some(nickname) = &nickname {
                    items.push(Reservation {
                        number,
                        nickname: nickname.clone(),
                    });
                }
                Ok(())
            })
            .await?;

        match &nickname {
            Some(n) => log::info!("Number {number} reserved by {n}"),
            None => log::info!("Number {number} released"),
        }
        Ok(())
    }

    pub async fn clear(&self) -> AppResult<()> {
        self.repo
            .update(&CollectionKey::Names, |items: &mut Vec<Reservation>| {
                items.clear();
                Ok(())
            })
            .await?;
        log::info!("All reservations cleared");
        Ok(())
    }
}
