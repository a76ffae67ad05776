use crate::error::{AppError, AppResult};
use crate::models::PrizeCounter;
use crate::store::{CollectionKey, Repository};

#[derive(Clone)]
pub struct PrizeService {
    repo: Repository,
}

impl PrizeService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// 奖品集合不存在时返回 `NotFound`
    pub async fn list(&self) -> AppResult<Vec<PrizeCounter>> {
        let (items, _) = self
            .repo
            .load_existing(&CollectionKey::Prizes)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Prize list not found".into()),
                other => other,
            })?;
        Ok(items)
    }

    /// 更新已有奖品的库存; 奖品不存在时不写入
    pub async fn update_count(&self, prize: Option<&str>, count: Option<i64>) -> AppResult<()> {
        let prize = prize.map(str::trim).filter(|p| !p.is_empty());
        let (prize, count) = match (prize, count) {
            (Some(p), Some(c)) if c >= 0 => {
                let c = u32::try_from(c)
                    .map_err(|_| AppError::ValidationError(format!("count is too large: {c}")))?;
                (p.to_string(), c)
            }
            _ => return Err(AppError::ValidationError("Invalid prize data".into())),
        };

        self.repo
            .update(&CollectionKey::Prizes, |items: &mut Vec<PrizeCounter>| {
                let item = items
                    .iter_mut()
                    .find(|p| p.prize == prize)
                    .ok_or_else(|| AppError::NotFound("Prize not found".into()))?;
                item.count = count;
                Ok(())
            })
            .await?;

        log::info!("Prize \"{prize}\" count set to {count}");
        Ok(())
    }
}
