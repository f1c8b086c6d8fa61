use std::iter::FusedIterator;

use rowset_api::converter::RowConverter;
use rowset_api::cursor::{AsyncCursor, Cursor};
use rowset_api::result::ResultSet;
use rowset_api::row::ResultRow;

use crate::config::UnprofiledPolicy;
use crate::error::EngineError;
use crate::reader::{ResultSetReader, read_result_sets_async};
use crate::statistics::{StatisticsRow, is_statistics_schema};

/// One profiled execution unit: a statistics block and the result set it
/// describes.
///
/// `result` is `None` for statements that return no rows (the statistics
/// block is the first output). `statistics` is `None` only when unprofiled
/// results are emitted (`UnprofiledPolicy::Emit`).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProfiledResult {
    pub statistics: Option<ResultSet<StatisticsRow>>,
    pub result: Option<ResultSet<ResultRow>>,
}

/// Pairs raw result sets with the statistics block that follows them.
///
/// Fed with result sets in cursor order. A statistics block always comes
/// right after the result set it profiles, so only the last raw set is held.
#[derive(Debug)]
pub struct ProfilePairer {
    held: Option<ResultSet<ResultRow>>,
    policy: UnprofiledPolicy,
}

impl ProfilePairer {
    pub fn new(policy: UnprofiledPolicy) -> Self {
        Self { held: None, policy }
    }

    /// Feed the next result set. Returns a completed unit, if any.
    pub fn push(&mut self, set: ResultSet<ResultRow>) -> Result<Option<ProfiledResult>, EngineError> {
        if is_statistics_schema(&set.columns) {
            let converter = RowConverter::<StatisticsRow>::for_columns(&set.columns);
            let rows = set
                .rows
                .into_iter()
                .map(|row| converter.convert(row))
                .collect::<Result<Vec<_>, _>>()?;
            let result = self.held.take();
            tracing::debug!(
                operators = rows.len(),
                profiled_rows = result.as_ref().map(|r| r.rows.len()),
                "statistics block paired"
            );
            return Ok(Some(ProfiledResult {
                statistics: Some(ResultSet::new(set.columns, rows)),
                result,
            }));
        }

        Ok(self.held.replace(set).and_then(|prev| self.unprofiled(prev)))
    }

    /// End of output. Flushes the held raw set according to the policy.
    pub fn finish(mut self) -> Option<ProfiledResult> {
        let held = self.held.take()?;
        self.unprofiled(held)
    }

    fn unprofiled(&self, set: ResultSet<ResultRow>) -> Option<ProfiledResult> {
        match self.policy {
            UnprofiledPolicy::Drop => {
                tracing::warn!(
                    columns = set.columns.len(),
                    rows = set.rows.len(),
                    "result set has no statistics block, dropping"
                );
                None
            }
            UnprofiledPolicy::Emit => Some(ProfiledResult {
                statistics: None,
                result: Some(set),
            }),
        }
    }
}

/// Single-pass reader over a profiled statement's output.
pub struct ProfiledReader<C> {
    sets: ResultSetReader<C, ResultRow>,
    /// `None` once the output is exhausted or an error was yielded.
    pairer: Option<ProfilePairer>,
}

impl<C: Cursor> ProfiledReader<C> {
    pub fn new(cursor: C, policy: UnprofiledPolicy) -> Self {
        Self {
            sets: ResultSetReader::new(cursor),
            pairer: Some(ProfilePairer::new(policy)),
        }
    }
}

impl<C: Cursor> Iterator for ProfiledReader<C> {
    type Item = Result<ProfiledResult, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pairer = self.pairer.as_mut()?;
            match self.sets.next() {
                Some(Ok(set)) => match pairer.push(set) {
                    Ok(Some(profiled)) => return Some(Ok(profiled)),
                    Ok(None) => continue,
                    Err(e) => {
                        self.pairer = None;
                        return Some(Err(e));
                    }
                },
                Some(Err(e)) => {
                    self.pairer = None;
                    return Some(Err(e));
                }
                None => return self.pairer.take().and_then(ProfilePairer::finish).map(Ok),
            }
        }
    }
}

impl<C: Cursor> FusedIterator for ProfiledReader<C> {}

/// Eagerly read a profiled statement's output.
pub fn read_profiled<C: Cursor>(
    cursor: C,
    policy: UnprofiledPolicy,
) -> Result<Vec<ProfiledResult>, EngineError> {
    ProfiledReader::new(cursor, policy).collect()
}

/// Async counterpart of [`read_profiled`].
pub async fn read_profiled_async<C>(
    cursor: &mut C,
    policy: UnprofiledPolicy,
) -> Result<Vec<ProfiledResult>, EngineError>
where
    C: AsyncCursor + ?Sized,
{
    let sets = read_result_sets_async::<C, ResultRow>(cursor).await?;
    let mut pairer = ProfilePairer::new(policy);
    let mut profiled = Vec::new();
    for set in sets {
        profiled.extend(pairer.push(set)?);
    }
    profiled.extend(pairer.finish());
    Ok(profiled)
}
