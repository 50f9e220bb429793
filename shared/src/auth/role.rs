//! 角色与能力
//!
//! 封闭的角色枚举替代散落的角色字符串比较。
//! 每个需要授权的操作对应一个 [`Capability`]，
//! 授权规则集中在 [`Role::can`] 这一张表里。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 平台角色 (与身份服务的 role claim 一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    RestaurantOwner,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Customer => "CUSTOMER",
            Role::RestaurantOwner => "RESTAURANT_OWNER",
            Role::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Role::Customer),
            "RESTAURANT_OWNER" => Ok(Role::RestaurantOwner),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// 需要授权的操作
///
/// 资源所有权检查 (例如 "本人可读自己的预订") 不在这里，
/// 由服务层结合 `user.id` 判断；这里只覆盖跨客户的员工/管理操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// 读取任意客户的预订
    ReadAnyReservation,
    /// 按餐厅列出预订 (员工看板)
    ListRestaurantReservations,
    /// 修改预订状态 (确认/完成/标记未到店)
    SetReservationStatus,
    /// 读取任意客户的订单
    ReadAnyOrder,
    /// 按餐厅列出订单 (员工看板)
    ListRestaurantOrders,
    /// 推进订单状态
    UpdateOrderStatus,
    /// 读取任意客户的支付记录
    ReadAnyPayment,
    /// 对任意支付发起退款
    RefundAnyPayment,
}

impl Role {
    /// 能力检查表
    pub fn can(self, cap: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => true,
            Role::RestaurantOwner => matches!(
                cap,
                ListRestaurantReservations
                    | SetReservationStatus
                    | ListRestaurantOrders
                    | UpdateOrderStatus
            ),
            Role::Customer => false,
        }
    }

    /// 是否餐厅员工 (餐厅老板或平台管理员)
    pub fn is_staff(self) -> bool {
        matches!(self, Role::RestaurantOwner | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Capability::*;

    #[test]
    fn admin_can_everything() {
        for cap in [
            ReadAnyReservation,
            ListRestaurantReservations,
            SetReservationStatus,
            ReadAnyOrder,
            ListRestaurantOrders,
            UpdateOrderStatus,
            ReadAnyPayment,
            RefundAnyPayment,
        ] {
            assert!(Role::Admin.can(cap));
        }
    }

    #[test]
    fn customer_has_no_staff_capabilities() {
        assert!(!Role::Customer.can(SetReservationStatus));
        assert!(!Role::Customer.can(UpdateOrderStatus));
        assert!(!Role::Customer.can(ReadAnyReservation));
        assert!(!Role::Customer.is_staff());
    }

    #[test]
    fn owner_manages_restaurant_but_not_payments() {
        assert!(Role::RestaurantOwner.can(SetReservationStatus));
        assert!(Role::RestaurantOwner.can(UpdateOrderStatus));
        assert!(Role::RestaurantOwner.can(ListRestaurantOrders));
        assert!(!Role::RestaurantOwner.can(RefundAnyPayment));
        assert!(!Role::RestaurantOwner.can(ReadAnyReservation));
    }

    #[test]
    fn role_string_round_trip() {
        for role in [Role::Customer, Role::RestaurantOwner, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("WAITER".parse::<Role>().is_err());
    }
}
