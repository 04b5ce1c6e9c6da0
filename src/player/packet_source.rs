use crate::core::Result;
use ffmpeg_next::Packet;

/// 数据包来源抽象接口
///
/// 按容器顺序返回所有流的数据包，由 PacketPump 负责按流过滤。
pub trait PacketSource {
    /// 读取下一个数据包
    ///
    /// 返回：
    /// - Ok(Some(packet)): 成功读取一个包（`packet.stream()` 为所属流索引）
    /// - Ok(None): 到达文件末尾
    /// - Err(e): 读取错误（不重试）
    fn read_packet(&mut self) -> Result<Option<Packet>>;

    /// 获取描述信息（用于日志）
    fn description(&self) -> String;
}
