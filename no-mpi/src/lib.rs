//! Stand-in for the handful of MPI collectives the radiation code uses,
//! behaving as if every process ran on MPI_COMM_SELF.

pub trait AsSlice {
    fn copy_from(&mut self, src: &Self);
}

impl<T: Copy> AsSlice for T {
    fn copy_from(&mut self, src: &Self) {
        *self = *src;
    }
}

impl<T: Copy> AsSlice for [T] {
    fn copy_from(&mut self, src: &Self) {
        self.copy_from_slice(src)
    }
}

pub trait Operation {}

#[allow(non_camel_case_types)]
pub enum SystemOperation {
    min(),
    max(),
    sum(),
}

impl Operation for SystemOperation {}

pub trait Communicator {
    /// With a single task, the reduction of `send` is `send` itself.
    fn all_reduce_into<S: AsSlice + ?Sized, O: Operation>(&self, send: &S, recv: &mut S, _op: O) {
        recv.copy_from(send);
    }

    fn rank(&self) -> i32 {
        0
    }

    fn size(&self) -> i32 {
        1
    }
}

pub struct SingleTask {}
impl Communicator for SingleTask {}

pub struct Universe {}

impl Universe {
    pub fn world(&self) -> SingleTask {
        SingleTask {}
    }
}

pub fn initialize() -> Option<Universe> {
    Some(Universe {})
}
