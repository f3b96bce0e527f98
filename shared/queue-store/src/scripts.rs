//! Lua scripts for moves that must be atomic against concurrent workers
//!
//! Scripts return `1` on success, `-1` when the job hash is missing, `-2` when
//! the job is not in the expected state and `-3` when a worker holds its lock.

use std::sync::LazyLock;

use redis::Script;

pub const OK: i64 = 1;
pub const MISSING_JOB: i64 = -1;
pub const LOCKED: i64 = -3;

/// KEYS: source set, wait, paused, meta-paused, job hash. ARGV: job id, mode.
///
/// Mode `retry` clears the failure bookkeeping, mode `promote` zeroes the delay.
pub static MOVE_TO_WAIT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
if redis.call("EXISTS", KEYS[5]) == 0 then
  return -1
end
if redis.call("ZREM", KEYS[1], ARGV[1]) == 0 then
  return -2
end
if ARGV[2] == "retry" then
  redis.call("HDEL", KEYS[5], "failedReason", "finishedOn", "processedOn")
else
  redis.call("HSET", KEYS[5], "delay", 0)
end
local target = KEYS[2]
if redis.call("EXISTS", KEYS[4]) == 1 then
  target = KEYS[3]
end
redis.call("LPUSH", target, ARGV[1])
return 1
"#,
    )
});

/// KEYS: job hash, job lock, job logs, wait, active, paused, completed,
/// failed, delayed, priority. ARGV: job id.
pub static REMOVE_JOB: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
if redis.call("EXISTS", KEYS[1]) == 0 then
  return -1
end
if redis.call("EXISTS", KEYS[2]) == 1 then
  return -3
end
for i = 4, 6 do
  redis.call("LREM", KEYS[i], 0, ARGV[1])
end
for i = 7, 10 do
  redis.call("ZREM", KEYS[i], ARGV[1])
end
redis.call("DEL", KEYS[1], KEYS[3])
return 1
"#,
    )
});

/// KEYS: state key, priority. ARGV: job key prefix, `list` or `zset`.
///
/// Locked jobs are left in place. Returns the number of jobs removed.
pub static CLEAN_STATE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
local ids
if ARGV[2] == "list" then
  ids = redis.call("LRANGE", KEYS[1], 0, -1)
else
  ids = redis.call("ZRANGE", KEYS[1], 0, -1)
end
local removed = 0
for _, id in ipairs(ids) do
  local job = ARGV[1] .. id
  if redis.call("EXISTS", job .. ":lock") == 0 then
    if ARGV[2] == "list" then
      redis.call("LREM", KEYS[1], 0, id)
    else
      redis.call("ZREM", KEYS[1], id)
    end
    redis.call("ZREM", KEYS[2], id)
    redis.call("DEL", job, job .. ":logs")
    removed = removed + 1
  end
end
return removed
"#,
    )
});

/// KEYS: source list, destination list, meta-paused. ARGV: `paused` or `resumed`.
pub static SET_PAUSED: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
if redis.call("EXISTS", KEYS[1]) == 1 then
  if redis.call("EXISTS", KEYS[2]) == 0 then
    redis.call("RENAME", KEYS[1], KEYS[2])
  else
    while redis.call("RPOPLPUSH", KEYS[1], KEYS[2]) do end
  end
end
if ARGV[1] == "paused" then
  redis.call("SET", KEYS[3], 1)
else
  redis.call("DEL", KEYS[3])
end
return 1
"#,
    )
});
