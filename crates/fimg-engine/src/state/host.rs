use crate::device::{RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{ATTRIB_NUM, FGHI_CONTROL, FGHI_IDXOFFSET, fghi_attrib, fghi_vbbase, fghi_vbctrl};
use crate::word::register_word;

register_word! {
    /// `FGHI_CONTROL`: host interface configuration.
    pub struct HostInterface {
        num_out_attrib, set_num_out_attrib: u32 @ 0, 4;
        vertex_cache_enable, set_vertex_cache_enable: bool @ 4, 1;
        auto_increment, set_auto_increment: bool @ 16, 1;
        index_type, set_index_type: u32 @ 24, 2;
        vertex_buffer_enable, set_vertex_buffer_enable: bool @ 31, 1;
    }
}

register_word! {
    /// `FGHI_ATTRIB_VBCTRL(i)`: vertex buffer range and stride.
    pub struct VertexBufferControl {
        range, set_range: u32 @ 0, 16;
        stride, set_stride: u32 @ 24, 8;
    }
}

register_word! {
    /// `FGHI_ATTRIB(i)`: component swizzle and data type of one attribute.
    pub struct Attribute {
        src_x, set_src_x: u32 @ 0, 2;
        src_y, set_src_y: u32 @ 2, 2;
        src_z, set_src_z: u32 @ 4, 2;
        src_w, set_src_w: u32 @ 6, 2;
        /// Component count minus one.
        num_comp, set_num_comp: u32 @ 8, 2;
        data_type, set_data_type: u32 @ 12, 4;
        last_attr, set_last_attr: bool @ 31, 1;
    }
}

impl Attribute {
    /// Float data type encoding.
    pub const DT_FLOAT: u32 = 0x7;

    /// Identity swizzle, four float components.
    pub fn float4() -> Self {
        let mut a = Self::default();
        a.set_src_x(0);
        a.set_src_y(1);
        a.set_src_z(2);
        a.set_src_w(3);
        a.set_num_comp(3);
        a.set_data_type(Self::DT_FLOAT);
        a
    }
}

/// Host interface and vertex fetch configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HostState {
    pub attrib: [Attribute; ATTRIB_NUM],
    pub vbctrl: [VertexBufferControl; ATTRIB_NUM],
    pub vbbase: [u32; ATTRIB_NUM],
    pub control: HostInterface,
    pub index_offset: u32,
}

impl Default for HostState {
    fn default() -> Self {
        let mut attrib = [Attribute::float4(); ATTRIB_NUM];
        attrib[0].set_last_attr(true);

        let mut control = HostInterface::default();
        control.set_num_out_attrib(1);
        control.set_auto_increment(true);
        control.set_vertex_buffer_enable(true);

        Self {
            attrib,
            vbctrl: [VertexBufferControl::default(); ATTRIB_NUM],
            vbbase: [0; ATTRIB_NUM],
            control,
            index_offset: 0,
        }
    }
}

impl HostState {
    /// Configures one vertex attribute and its buffer slice.
    pub fn set_attribute(
        &mut self,
        queue: &mut RegisterQueue,
        index: usize,
        mut attrib: Attribute,
        vbctrl: VertexBufferControl,
        vbbase: u32,
    ) {
        // The terminator flag is owned by `set_attribute_count`.
        attrib.set_last_attr(self.attrib[index].last_attr());
        self.attrib[index] = attrib;
        self.vbctrl[index] = vbctrl;
        self.vbbase[index] = vbbase;
        queue.write(fghi_attrib(index), attrib.to_raw_word());
        queue.write(fghi_vbctrl(index), vbctrl.to_raw_word());
        queue.write(fghi_vbbase(index), vbbase);
    }

    /// Marks attribute `count - 1` as the last one fetched.
    pub fn set_attribute_count(&mut self, queue: &mut RegisterQueue, count: usize) {
        let count = count.clamp(1, ATTRIB_NUM);
        for (i, attrib) in self.attrib.iter_mut().enumerate() {
            let last = i + 1 == count;
            if attrib.last_attr() != last {
                attrib.set_last_attr(last);
                queue.write(fghi_attrib(i), attrib.to_raw_word());
            }
        }
        self.set_control_field(queue, |c| c.set_num_out_attrib(count as u32));
    }

    pub fn set_control(&mut self, queue: &mut RegisterQueue, control: HostInterface) {
        self.control = control;
        queue.write(FGHI_CONTROL, control.to_raw_word());
    }

    pub fn set_index_offset(&mut self, queue: &mut RegisterQueue, offset: u32) {
        self.index_offset = offset;
        queue.write(FGHI_IDXOFFSET, offset);
    }

    fn set_control_field(&mut self, queue: &mut RegisterQueue, f: impl FnOnce(&mut HostInterface)) {
        let mut control = self.control;
        f(&mut control);
        self.set_control(queue, control);
    }

    pub(crate) fn restore<W: RegisterWindow>(&self, regs: &mut Registers<W>) {
        regs.write(FGHI_CONTROL, self.control.to_raw_word());
        regs.write(FGHI_IDXOFFSET, self.index_offset);
        for i in 0..ATTRIB_NUM {
            regs.write(fghi_attrib(i), self.attrib[i].to_raw_word());
            regs.write(fghi_vbctrl(i), self.vbctrl[i].to_raw_word());
            regs.write(fghi_vbbase(i), self.vbbase[i]);
        }
    }
}
